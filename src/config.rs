//! Generator configuration
//!
//! Lets a project rename the runtime contracts, the discovery marker and the
//! generated naming scheme via a `mvigen.toml` file that sits alongside the
//! type-graph manifest. Every field has a default, so the file is optional.
//!
//! ```toml
//! marker = "mvi.Processor"
//! executor_suffix = "ProcessorExecutor"
//! init_only_grouping = "declaring-type"
//!
//! [event_contract]
//! name = "mvi.IntentProcessor"
//! state = { param = "S", position = 0 }
//! event = { param = "I", position = 1 }
//! effect = { param = "E", position = 2 }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up next to the type-graph manifest.
pub const CONFIG_FILE_NAME: &str = "mvigen.toml";

/// A named type-parameter slot of a handler contract.
///
/// `param` is matched against the contract declaration's type parameters;
/// `position` is only consulted when the contract itself is not part of the
/// type graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub param: String,
    pub position: usize,
}

impl SlotRef {
    pub fn new(param: impl Into<String>, position: usize) -> Self {
        SlotRef {
            param: param.into(),
            position,
        }
    }
}

/// Shape of a recognized handler contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractShape {
    /// Fully-qualified name of the contract interface
    pub name: String,
    pub state: SlotRef,
    /// Absent for initializer contracts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<SlotRef>,
    pub effect: SlotRef,
}

impl ContractShape {
    pub fn default_event() -> Self {
        ContractShape {
            name: "mvi.IntentProcessor".to_string(),
            state: SlotRef::new("S", 0),
            event: Some(SlotRef::new("I", 1)),
            effect: SlotRef::new("E", 2),
        }
    }

    pub fn default_init() -> Self {
        ContractShape {
            name: "mvi.InitProcessor".to_string(),
            state: SlotRef::new("S", 0),
            event: None,
            effect: SlotRef::new("E", 1),
        }
    }
}

/// How initializer handlers without a matching event feature are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitOnlyGrouping {
    /// Each initializer forms its own feature, keyed by its declaring type.
    #[default]
    DeclaringType,
    /// Initializers sharing a state type form one feature, so duplicates are
    /// caught by the multiplicity check.
    StateType,
}

/// Generator configuration loaded from `mvigen.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenConfig {
    /// Discovery marker annotation
    pub marker: String,
    /// Appended to the feature's visible name to form the dispatcher name
    pub executor_suffix: String,
    /// Namespace segment appended to the representative's package
    pub generated_segment: String,
    /// Rust path of the runtime crate providing the processor traits
    pub runtime_path: String,
    /// Rust path prefix that qualified names are mapped under
    pub type_path_root: String,
    pub init_only_grouping: InitOnlyGrouping,
    /// File name of the dependency manifest written by `FsHost`
    pub deps_manifest: String,
    pub event_contract: ContractShape,
    pub init_contract: ContractShape,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            marker: "mvi.Processor".to_string(),
            executor_suffix: "ProcessorExecutor".to_string(),
            generated_segment: "generated".to_string(),
            runtime_path: "mvi_runtime".to_string(),
            type_path_root: "crate".to_string(),
            init_only_grouping: InitOnlyGrouping::default(),
            deps_manifest: "mvigen-deps.json".to_string(),
            event_contract: ContractShape::default_event(),
            init_contract: ContractShape::default_init(),
        }
    }
}

impl CodegenConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, has unknown keys, or the
    /// event contract lacks an event slot.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: CodegenConfig = toml::from_str(contents)?;
        if config.event_contract.event.is_none() {
            anyhow::bail!(
                "event_contract '{}' must declare an event slot",
                config.event_contract.name
            );
        }
        Ok(config)
    }
}

/// Load configuration from a TOML file
///
/// Returns `Ok(None)` if the file doesn't exist (not an error) and `Err` if
/// it exists but fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<CodegenConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config = CodegenConfig::from_toml_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// Look for `mvigen.toml` in the same directory as the manifest.
pub fn auto_detect_config_path(graph_path: &Path) -> Option<PathBuf> {
    let config_path = graph_path.parent()?.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Resolve the configuration to use for a run
///
/// Priority:
/// 1. Explicitly provided path (must exist)
/// 2. Auto-detected alongside the manifest
/// 3. Defaults
pub fn resolve_config(explicit_path: Option<&Path>, graph_path: &Path) -> anyhow::Result<CodegenConfig> {
    if let Some(path) = explicit_path {
        return load_config(path)?
            .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", path.display()));
    }
    match auto_detect_config_path(graph_path) {
        Some(path) => Ok(load_config(&path)?.unwrap_or_default()),
        None => Ok(CodegenConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = CodegenConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodegenConfig::default());
        assert_eq!(config.event_contract.event, Some(SlotRef::new("I", 1)));
    }

    #[test]
    fn test_partial_override() {
        let config = CodegenConfig::from_toml_str(
            r#"
executor_suffix = "Dispatcher"
init_only_grouping = "state-type"

[init_contract]
name = "app.Bootstrap"
state = { param = "T", position = 1 }
effect = { param = "F", position = 0 }
"#,
        )
        .unwrap();
        assert_eq!(config.executor_suffix, "Dispatcher");
        assert_eq!(config.init_only_grouping, InitOnlyGrouping::StateType);
        assert_eq!(config.init_contract.state, SlotRef::new("T", 1));
        assert_eq!(config.marker, "mvi.Processor");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CodegenConfig::from_toml_str("suffix = \"X\"").is_err());
    }

    #[test]
    fn test_event_contract_needs_event_slot() {
        let err = CodegenConfig::from_toml_str(
            r#"
[event_contract]
name = "app.Handler"
state = { param = "S", position = 0 }
effect = { param = "E", position = 1 }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("event slot"));
    }

    #[test]
    fn test_resolve_config_priority() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join("graph.yaml");
        fs::write(&graph, "declarations: []").unwrap();

        // Nothing next to the manifest: defaults.
        let config = resolve_config(None, &graph).unwrap();
        assert_eq!(config, CodegenConfig::default());

        fs::write(dir.path().join(CONFIG_FILE_NAME), "executor_suffix = \"Auto\"").unwrap();
        assert_eq!(resolve_config(None, &graph).unwrap().executor_suffix, "Auto");

        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "executor_suffix = \"Explicit\"").unwrap();
        assert_eq!(
            resolve_config(Some(&explicit), &graph).unwrap().executor_suffix,
            "Explicit"
        );

        let missing = dir.path().join("missing.toml");
        assert!(resolve_config(Some(&missing), &graph).is_err());
    }
}
