use crate::config::CodegenConfig;
use crate::graph::{default_package, TypeGraph, TypeRef};
use std::collections::HashSet;
use std::path::PathBuf;

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn",
];

/// Prefix Rust keywords with `r#`.
pub fn sanitize_rust_identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Convert `SubmitProcessor` or `HTTPLoader` to `submit_processor` / `http_loader`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && !out.ends_with('_') && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Reserve `name` in `seen`, appending `_1`, `_2`, ... on collision.
pub(crate) fn unique_field_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Package a referenced type lives in, preferring the graph's declaration.
pub fn package_of<G: TypeGraph + ?Sized>(graph: &G, ty: &TypeRef) -> String {
    graph
        .declaration(&ty.name)
        .map(|d| d.package.clone())
        .unwrap_or_else(|| default_package(&ty.name))
}

/// Map a qualified type reference to a Rust path under `type_path_root`.
///
/// `app.login.LoginIntent.Submit` becomes `crate::app::login::Submit`.
pub fn rust_type_path<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &CodegenConfig,
    ty: &TypeRef,
) -> String {
    let package = package_of(graph, ty);
    let mut path = config.type_path_root.clone();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        path.push_str("::");
        path.push_str(&sanitize_rust_identifier(segment));
    }
    path.push_str("::");
    path.push_str(&sanitize_rust_identifier(ty.simple_name()));
    if !ty.args.is_empty() {
        let args: Vec<String> = ty
            .args
            .iter()
            .map(|a| rust_type_path(graph, config, a))
            .collect();
        path.push('<');
        path.push_str(&args.join(", "));
        path.push('>');
    }
    path
}

/// Namespace for a feature's generated code: `{package}.{generated_segment}`.
pub fn generated_namespace(config: &CodegenConfig, package: &str) -> String {
    if package.is_empty() {
        config.generated_segment.clone()
    } else {
        format!("{package}.{}", config.generated_segment)
    }
}

/// Directory (relative to the output root) holding a namespace's files.
pub fn namespace_dir(namespace: &str) -> PathBuf {
    namespace
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<PathBuf>()
}
