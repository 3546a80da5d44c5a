use askama::Template;

/// One routing branch: an intent variant delegated to its processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    /// Struct field (and constructor parameter) holding the processor
    pub field: String,
    /// Rust path of the processor type
    pub handler_path: String,
    /// Variant of the base intent enum
    pub variant: String,
    /// Rust path of the concrete intent type
    pub intent_path: String,
}

/// Template data for generating one dispatcher module
#[derive(Template, Debug, Clone)]
#[template(path = "dispatcher.rs.txt", escape = "none")]
pub struct DispatcherTemplateData {
    /// Dispatcher struct name (e.g. `LoginIntentProcessorExecutor`)
    pub name: String,
    pub feature_key: String,
    /// Rust path of the runtime crate
    pub runtime: String,
    pub state_path: String,
    pub effect_path: String,
    pub has_event: bool,
    /// Base intent enum path; empty for initializer-only features
    pub event_path: String,
    /// In declaring-type order
    pub branches: Vec<BranchEntry>,
    pub has_init: bool,
    pub init_field: String,
    pub init_path: String,
    /// Qualified names of every contributing processor
    pub sources: Vec<String>,
}

/// Module declared in a generated namespace's `mod.rs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModEntry {
    pub module: String,
    pub type_name: String,
}

/// Template data for a generated namespace's `mod.rs`
#[derive(Template, Debug, Clone)]
#[template(path = "mod.rs.txt", escape = "none")]
pub struct ModRsTemplateData {
    pub modules: Vec<ModEntry>,
}
