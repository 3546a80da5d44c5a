//! # mvigen
//!
//! **mvigen** generates exhaustive intent dispatchers for Model-View-Intent
//! features at build time. Application code declares small processors, one per
//! concrete intent plus an optional initializer, and marks them with
//! `mvi.Processor`. The generator finds them in the host's type graph, groups
//! them into features, checks that each feature is well formed, and writes one
//! `ProcessorExecutor` per feature whose `match` covers every intent variant.
//!
//! ## Architecture
//!
//! - **[`graph`]** - Type-graph facade and the manifest-backed [`ModelGraph`]
//! - **[`pipeline`]** - Descriptor extraction, feature grouping and validation
//! - **[`generator`]** - Askama templates, naming, and the [`CodegenHost`] seam
//! - **[`pass`]** - One stateless discovery pass tying the stages together
//! - **[`diagnostics`]** - Every reported problem, with location and kind
//! - **[`config`]** - `mvigen.toml` contract and naming overrides
//! - **[`hot_reload`]** - Re-run the pass when the manifest changes
//! - **[`cli`]** - `mvigen generate | check | inspect`
//! - **[`logging`]** - `tracing` subscriber setup for the binary
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(mvigen)
//!     participant Load as graph::load_graph
//!     participant Pass as pass::run_pass
//!     participant Pipeline as pipeline
//!     participant Templates as generator::templates
//!     participant Host as FsHost
//!
//!     User->>CLI: mvigen generate --graph graph.yaml --output src/
//!     CLI->>Load: load_graph("graph.yaml")
//!     Load-->>CLI: ModelGraph
//!     CLI->>Pass: run_pass(&graph, &config, &mut host)
//!     Pass->>Pipeline: extract each marked, valid declaration
//!     Pipeline-->>Pass: HandlerDescriptor[]
//!     Pass->>Pipeline: group + validate
//!     Pipeline-->>Pass: ValidatedFeature[] + diagnostics
//!     Pass->>Templates: render dispatcher per feature
//!     Templates-->>Pass: Rust source
//!     Pass->>Host: write_artifact + register_aggregating
//!     Pass->>Host: finish() (dependency manifest)
//!     Pass-->>CLI: PassReport
//!     CLI-->>User: ✅ Generated ... / diagnostics
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use mvigen::{load_graph, run_pass, CodegenConfig, FsHost};
//! use std::path::Path;
//!
//! let graph = load_graph(Path::new("graph.yaml"))?;
//! let config = CodegenConfig::default();
//! let mut host = FsHost::new("src", config.deps_manifest.clone());
//! let report = run_pass(&graph, &config, &mut host);
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Guarantees
//!
//! - A pass is a pure function of the graph: no caches, no statics
//! - Output is byte-identical regardless of discovery order
//! - A failing declaration or feature never blocks the others
//! - Declarations that are not resolvable yet are deferred, not reported

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod graph;
pub mod hot_reload;
pub mod logging;
pub mod pass;
pub mod pipeline;

pub use config::{resolve_config, CodegenConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use generator::{CodegenHost, FsHost, MemoryHost};
pub use graph::{load_graph, ModelGraph, TypeGraph};
pub use pass::{run_pass, PassReport};
