use askama::Template;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{debug, error};

use super::host::CodegenHost;
use super::naming::{
    generated_namespace, namespace_dir, rust_type_path, sanitize_rust_identifier, to_snake_case,
    unique_field_name,
};
use super::templates::{BranchEntry, DispatcherTemplateData, ModEntry, ModRsTemplateData};
use crate::config::CodegenConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::{TypeGraph, TypeId};
use crate::pipeline::{GeneratedArtifact, ValidatedFeature};

/// A dispatcher rendered in memory, not yet handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDispatcher {
    pub artifact: GeneratedArtifact,
    /// Path relative to the output root
    pub path: PathBuf,
    pub contents: String,
    /// Declaring-file locations of every contributing processor
    pub sources: BTreeSet<PathBuf>,
}

/// Where a feature's dispatcher will be written, and under which name.
pub fn target_of(config: &CodegenConfig, feature: &ValidatedFeature) -> (String, String, PathBuf) {
    let namespace = generated_namespace(config, &feature.package);
    let name = format!("{}{}", feature.visible_name, config.executor_suffix);
    let path = namespace_dir(&namespace).join(format!("{}.rs", to_snake_case(&name)));
    (namespace, name, path)
}

/// Render a validated feature's dispatcher.
///
/// # Errors
///
/// Returns an error if template rendering fails.
pub fn render_dispatcher<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &CodegenConfig,
    feature: &ValidatedFeature,
) -> anyhow::Result<RenderedDispatcher> {
    let (namespace, name, path) = target_of(config, feature);
    let mut seen = HashSet::new();

    let branches: Vec<BranchEntry> = feature
        .group
        .event_handlers()
        .filter_map(|d| d.event_type().map(|event| (d, event)))
        .map(|(d, event)| BranchEntry {
            field: unique_field_name(&mut seen, &field_name(&d.declaring_type)),
            handler_path: rust_type_path(graph, config, &d.declaring_type_ref()),
            variant: sanitize_rust_identifier(event.simple_name()),
            intent_path: rust_type_path(graph, config, event),
        })
        .collect();

    let init = feature.init_handler();
    let init_field = init
        .map(|d| unique_field_name(&mut seen, &field_name(&d.declaring_type)))
        .unwrap_or_default();
    let init_path = init
        .map(|d| rust_type_path(graph, config, &d.declaring_type_ref()))
        .unwrap_or_default();

    let event_path = feature
        .triple
        .event_type
        .as_ref()
        .map(|t| rust_type_path(graph, config, t))
        .unwrap_or_default();

    let data = DispatcherTemplateData {
        name: name.clone(),
        feature_key: feature.group.key.to_string(),
        runtime: config.runtime_path.clone(),
        state_path: rust_type_path(graph, config, &feature.triple.state_type),
        effect_path: rust_type_path(graph, config, &feature.triple.effect_type),
        has_event: feature.triple.event_type.is_some(),
        event_path,
        branches,
        has_init: init.is_some(),
        init_field,
        init_path,
        sources: feature
            .group
            .descriptors
            .iter()
            .map(|d| d.declaring_type.to_string())
            .collect(),
    };
    let contents = data.render()?;

    let sources = feature
        .group
        .descriptors
        .iter()
        .filter_map(|d| d.source.clone())
        .collect();
    let artifact = GeneratedArtifact {
        namespace,
        name,
        source_descriptors: feature
            .group
            .descriptors
            .iter()
            .map(|d| d.declaring_type.clone())
            .collect(),
    };
    Ok(RenderedDispatcher {
        artifact,
        path,
        contents,
        sources,
    })
}

fn field_name(declaring_type: &TypeId) -> String {
    sanitize_rust_identifier(&to_snake_case(declaring_type.simple_name()))
}

/// Render a feature and hand it to the host.
///
/// # Errors
///
/// Returns an `emission_io_failure` diagnostic if rendering or writing fails.
/// The failure is local to this feature.
pub fn emit<G, H>(
    graph: &G,
    config: &CodegenConfig,
    host: &mut H,
    feature: &ValidatedFeature,
) -> Result<RenderedDispatcher, Diagnostic>
where
    G: TypeGraph + ?Sized,
    H: CodegenHost + ?Sized,
{
    let io_failure = |err: anyhow::Error| {
        error!(feature = %feature.group.key, error = %err, "dispatcher emission failed");
        Diagnostic::error(
            DiagnosticKind::EmissionIoFailure,
            format!("feature:{}", feature.group.key),
            format!("failed to emit dispatcher: {err:#}"),
        )
    };
    let rendered = render_dispatcher(graph, config, feature).map_err(io_failure)?;
    host.write_artifact(&rendered.path, &rendered.contents)
        .map_err(io_failure)?;
    host.register_aggregating(&rendered.path, &rendered.artifact, &rendered.sources);
    debug!(path = %rendered.path.display(), "dispatcher written");
    Ok(rendered)
}

/// Write one `mod.rs` per generated namespace listing its dispatchers.
///
/// Returns the paths written and any failures as diagnostics.
pub fn emit_namespace_modules<H: CodegenHost + ?Sized>(
    host: &mut H,
    dispatchers: &[RenderedDispatcher],
) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let mut by_namespace: BTreeMap<&str, Vec<&RenderedDispatcher>> = BTreeMap::new();
    for dispatcher in dispatchers {
        by_namespace
            .entry(dispatcher.artifact.namespace.as_str())
            .or_default()
            .push(dispatcher);
    }

    let mut written = Vec::new();
    let mut diagnostics = Vec::new();
    for (namespace, members) in by_namespace {
        let mut modules: Vec<ModEntry> = members
            .iter()
            .map(|d| ModEntry {
                module: to_snake_case(&d.artifact.name),
                type_name: d.artifact.name.clone(),
            })
            .collect();
        modules.sort_by(|a, b| a.module.cmp(&b.module));

        let path = namespace_dir(namespace).join("mod.rs");
        let result = ModRsTemplateData { modules }
            .render()
            .map_err(anyhow::Error::from)
            .and_then(|contents| host.write_artifact(&path, &contents));
        if let Err(err) = result {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::EmissionIoFailure,
                format!("namespace:{namespace}"),
                format!("failed to write module index: {err:#}"),
            ));
            continue;
        }

        let sources: BTreeSet<PathBuf> = members
            .iter()
            .flat_map(|d| d.sources.iter().cloned())
            .collect();
        let artifact = GeneratedArtifact {
            namespace: namespace.to_string(),
            name: "mod".to_string(),
            source_descriptors: members
                .iter()
                .flat_map(|d| d.artifact.source_descriptors.iter().cloned())
                .collect(),
        };
        host.register_aggregating(&path, &artifact, &sources);
        written.push(path);
    }
    (written, diagnostics)
}
