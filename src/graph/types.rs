use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Fully-qualified identity of a declaration (e.g. `com.example.login.SubmitProcessor`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self {
        TypeId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dotted segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a declaration is, as far as the extractor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Object,
    Enum,
    Interface,
    TypeParameter,
    Primitive,
}

impl DeclKind {
    /// Class-like declarations that an event handler may be bound to.
    pub fn is_concrete(self) -> bool {
        matches!(self, DeclKind::Class | DeclKind::Object | DeclKind::Enum)
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclKind::Class => "class",
            DeclKind::Object => "object",
            DeclKind::Enum => "enum",
            DeclKind::Interface => "interface",
            DeclKind::TypeParameter => "type parameter",
            DeclKind::Primitive => "primitive",
        };
        f.write_str(s)
    }
}

/// A (possibly generic) reference to a type.
///
/// `param` marks references to a type parameter of an enclosing declaration.
/// Those never resolve to a declaration; they are bound by substitution while
/// walking a supertype chain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    pub param: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            param: false,
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef {
            name: name.into(),
            args,
            param: false,
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn id(&self) -> TypeId {
        TypeId::new(self.name.clone())
    }

    /// Parse `Name<Arg, Other<Nested>>`.
    pub fn parse(input: &str) -> Result<TypeRef, TypeRefParseError> {
        let mut parser = Parser {
            src: input,
            pos: 0,
        };
        let parsed = parser.type_ref()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }

    /// Mark every reference whose name is one of `params` as a type parameter.
    pub fn mark_params(&mut self, params: &[String]) {
        if self.args.is_empty() && params.iter().any(|p| p == &self.name) {
            self.param = true;
        }
        for arg in &mut self.args {
            arg.mark_params(params);
        }
    }

    /// Replace bound type parameters with their arguments.
    pub fn substitute(&self, bindings: &[(String, TypeRef)]) -> TypeRef {
        if self.param {
            if let Some((_, bound)) = bindings.iter().find(|(name, _)| name == &self.name) {
                return bound.clone();
            }
        }
        TypeRef {
            name: self.name.clone(),
            args: self.args.iter().map(|a| a.substitute(bindings)).collect(),
            param: self.param,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Error produced when a type reference string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefParseError {
    pub input: String,
    pub position: usize,
    pub reason: &'static str,
}

impl fmt::Display for TypeRefParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid type reference '{}' at column {}: {}",
            self.input, self.position, self.reason
        )
    }
}

impl std::error::Error for TypeRefParseError {}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn error(&self, reason: &'static str) -> TypeRefParseError {
        TypeRefParseError {
            input: self.src.to_string(),
            position: self.pos,
            reason,
        }
    }

    fn type_ref(&mut self) -> Result<TypeRef, TypeRefParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let name = &self.src[start..self.pos];
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') {
            return Err(self.error("expected a qualified name"));
        }
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.type_ref()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }
        // Nullability carries no routing information.
        if self.peek() == Some('?') {
            self.pos += 1;
        }
        Ok(TypeRef::with_args(name, args))
    }
}

/// A declaration visible in the type graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: TypeId,
    pub kind: DeclKind,
    pub package: String,
    pub type_parameters: Vec<String>,
    pub supertypes: Vec<TypeRef>,
    pub annotations: Vec<String>,
    pub file: Option<PathBuf>,
    pub resolvable: bool,
}

impl Declaration {
    pub fn simple_name(&self) -> &str {
        self.id.simple_name()
    }

    pub fn has_annotation(&self, marker: &str) -> bool {
        self.annotations.iter().any(|a| a == marker)
    }
}

pub(crate) fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Package of a qualified name, by convention the leading lowercase segments.
///
/// `com.example.login.LoginIntent.Submit` belongs to `com.example.login`.
pub fn default_package(qualified: &str) -> String {
    qualified
        .split('.')
        .take_while(|seg| seg.chars().next().is_some_and(|c| !c.is_uppercase()))
        .collect::<Vec<_>>()
        .join(".")
}
