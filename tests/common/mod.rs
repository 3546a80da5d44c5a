#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use mvigen::config::CodegenConfig;
use mvigen::diagnostics::DiagnosticKind;
use mvigen::graph::{load_graph, ModelGraph};
use mvigen::pass::{run_pass, PassReport};
use mvigen::MemoryHost;
use std::path::PathBuf;

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> ModelGraph {
    load_graph(&fixture_path(name)).unwrap()
}

/// Run one pass into a fresh in-memory host.
pub fn pass(graph: &ModelGraph, config: &CodegenConfig) -> (PassReport, MemoryHost) {
    let mut host = MemoryHost::new();
    let report = run_pass(graph, config, &mut host);
    (report, host)
}

pub fn pass_fixture(name: &str) -> (PassReport, MemoryHost) {
    pass(&load_fixture(name), &CodegenConfig::default())
}

pub fn kinds(report: &PassReport) -> Vec<DiagnosticKind> {
    report.diagnostics.iter().map(|d| d.kind).collect()
}

/// The same fixture with its declarations in reverse order.
pub fn reversed_fixture(name: &str) -> ModelGraph {
    let text = std::fs::read_to_string(fixture_path(name)).unwrap();
    let mut doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    let declarations = doc
        .get_mut("declarations")
        .and_then(serde_yaml::Value::as_sequence_mut)
        .unwrap();
    declarations.reverse();
    ModelGraph::from_yaml_str(&serde_yaml::to_string(&doc).unwrap()).unwrap()
}
