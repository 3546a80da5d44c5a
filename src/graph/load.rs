use super::facade::ModelGraph;
use super::types::{default_package, DeclKind, Declaration, TypeId, TypeRef};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    declarations: Vec<RawDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeclaration {
    name: String,
    kind: DeclKind,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    type_parameters: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    annotations: Vec<String>,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default = "default_resolvable")]
    resolvable: bool,
}

fn default_resolvable() -> bool {
    true
}

impl RawDeclaration {
    fn into_declaration(self) -> anyhow::Result<Declaration> {
        let mut supertypes = Vec::with_capacity(self.supertypes.len());
        for raw in &self.supertypes {
            let mut parsed = TypeRef::parse(raw)
                .with_context(|| format!("Invalid supertype of {}", self.name))?;
            parsed.mark_params(&self.type_parameters);
            supertypes.push(parsed);
        }
        let package = self
            .package
            .unwrap_or_else(|| default_package(&self.name));
        Ok(Declaration {
            id: TypeId::new(self.name),
            kind: self.kind,
            package,
            type_parameters: self.type_parameters,
            supertypes,
            annotations: self.annotations,
            file: self.file,
            resolvable: self.resolvable,
        })
    }
}

/// Load a type-graph manifest (YAML or JSON, chosen by extension).
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid manifest, or
/// declares the same qualified name twice.
pub fn load_graph(file_path: &Path) -> anyhow::Result<ModelGraph> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read type graph: {}", file_path.display()))?;
    let is_yaml = file_path
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);
    let graph = if is_yaml {
        ModelGraph::from_yaml_str(&content)
    } else {
        ModelGraph::from_json_str(&content)
    };
    let graph =
        graph.with_context(|| format!("Failed to parse type graph: {}", file_path.display()))?;
    if graph.is_empty() {
        warn!(path = %file_path.display(), "type graph declares nothing");
    }
    Ok(graph)
}

impl ModelGraph {
    /// Build a graph from YAML manifest text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML, malformed type references or
    /// duplicate declarations.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<ModelGraph> {
        let raw: RawManifest = serde_yaml::from_str(content)?;
        build_graph(raw)
    }

    /// Build a graph from JSON manifest text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON, malformed type references or
    /// duplicate declarations.
    pub fn from_json_str(content: &str) -> anyhow::Result<ModelGraph> {
        let raw: RawManifest = serde_json::from_str(content)?;
        build_graph(raw)
    }
}

fn build_graph(raw: RawManifest) -> anyhow::Result<ModelGraph> {
    let mut graph = ModelGraph::default();
    for decl in raw.declarations {
        let decl = decl.into_declaration()?;
        let name = decl.id.clone();
        if !graph.insert(decl) {
            anyhow::bail!("Duplicate declaration in type graph: {name}");
        }
    }
    Ok(graph)
}
