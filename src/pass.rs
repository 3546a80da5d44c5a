//! # Discovery Pass
//!
//! [`run_pass`] is the whole pipeline: discover, extract, group, validate,
//! emit. It is a pure function of the declarations visible in the graph right
//! now. Nothing is remembered between calls, so a host may invoke it as many
//! times as it likes while more symbols become resolvable; each pass rebuilds
//! the full descriptor and feature set from scratch.
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Pass as run_pass
//!     participant Extract as pipeline::extract
//!     participant Group as pipeline::group
//!     participant Emit as generator::emit
//!
//!     Host->>Pass: graph, config, host
//!     Pass->>Pass: marked(marker), split by validate()
//!     loop each valid declaration
//!         Pass->>Extract: extract(decl)
//!         Extract-->>Pass: HandlerDescriptor | ExtractError
//!     end
//!     Pass->>Group: group(descriptors)
//!     Group-->>Pass: ValidatedFeature[] + diagnostics
//!     loop each feature (sorted by key)
//!         Pass->>Emit: emit(feature)
//!         Emit->>Host: write_artifact, register_aggregating
//!     end
//!     Pass->>Host: finish()
//!     Pass-->>Host: PassReport
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, info_span};

use crate::config::CodegenConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::generator::{emit, emit_namespace_modules, target_of, CodegenHost};
use crate::graph::{TypeGraph, TypeId};
use crate::pipeline::{extract, group, GeneratedArtifact, HandlerDescriptor, ValidatedFeature};

/// Descriptors discovered in one pass, before grouping.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub descriptors: Vec<HandlerDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    /// Marked declarations not resolvable yet; retried by the next pass
    pub deferred: Vec<TypeId>,
}

/// Extract a descriptor from every valid marked declaration.
pub fn discover<G: TypeGraph + ?Sized>(graph: &G, config: &CodegenConfig) -> Discovery {
    let mut discovery = Discovery::default();
    for decl in graph.marked(&config.marker) {
        if !graph.validate(decl) {
            debug!(declaration = %decl.id, "deferred to a later pass");
            discovery.deferred.push(decl.id.clone());
            continue;
        }
        match extract(graph, config, decl) {
            Ok(descriptor) => discovery.descriptors.push(descriptor),
            Err(err) => discovery.diagnostics.push(err.to_diagnostic(config)),
        }
    }
    discovery
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Dispatchers written, in feature-key order
    pub artifacts: Vec<GeneratedArtifact>,
    /// Every file handed to the host, relative to its root
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    pub deferred: Vec<TypeId>,
}

impl PassReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Drop features whose dispatchers would land on the same file.
fn reject_path_collisions(
    config: &CodegenConfig,
    features: Vec<ValidatedFeature>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ValidatedFeature> {
    let mut by_path: BTreeMap<PathBuf, Vec<ValidatedFeature>> = BTreeMap::new();
    for feature in features {
        let (_, _, path) = target_of(config, &feature);
        by_path.entry(path).or_default().push(feature);
    }
    let mut kept = Vec::new();
    for (path, mut colliding) in by_path {
        if colliding.len() == 1 {
            kept.append(&mut colliding);
            continue;
        }
        let keys: Vec<String> = colliding.iter().map(|f| f.group.key.to_string()).collect();
        for feature in &colliding {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::ArtifactPathCollision,
                    format!("feature:{}", feature.group.key),
                    format!(
                        "features {} would all generate {}",
                        keys.join(", "),
                        path.display()
                    ),
                )
                .with_suggestion(
                    "Give each feature its own state type, or set init_only_grouping = \"state-type\"",
                ),
            );
        }
    }
    kept.sort_by(|a, b| a.group.key.cmp(&b.group.key));
    kept
}

/// Run one complete discovery pass against `host`.
///
/// Per-declaration and per-feature failures are reported through the host and
/// collected in the returned report; they never stop the rest of the pass.
pub fn run_pass<G, H>(graph: &G, config: &CodegenConfig, host: &mut H) -> PassReport
where
    G: TypeGraph + ?Sized,
    H: CodegenHost + ?Sized,
{
    let span = info_span!("discovery_pass", marker = %config.marker);
    let _enter = span.enter();

    let Discovery {
        descriptors,
        mut diagnostics,
        deferred,
    } = discover(graph, config);
    let descriptor_count = descriptors.len();

    let outcome = group(descriptors, config.init_only_grouping);
    diagnostics.extend(outcome.diagnostics);
    let features = reject_path_collisions(config, outcome.features, &mut diagnostics);

    let mut rendered = Vec::with_capacity(features.len());
    for feature in &features {
        match emit(graph, config, host, feature) {
            Ok(dispatcher) => rendered.push(dispatcher),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }
    let (module_files, module_diagnostics) = emit_namespace_modules(host, &rendered);
    diagnostics.extend(module_diagnostics);

    if let Err(err) = host.finish() {
        diagnostics.push(Diagnostic::error(
            DiagnosticKind::EmissionIoFailure,
            "dependencies",
            format!("failed to record dependencies: {err:#}"),
        ));
    }

    for diagnostic in &diagnostics {
        host.report(diagnostic);
    }

    let mut files: Vec<PathBuf> = rendered.iter().map(|d| d.path.clone()).collect();
    files.extend(module_files);
    let report = PassReport {
        artifacts: rendered.into_iter().map(|d| d.artifact).collect(),
        files,
        diagnostics,
        deferred,
    };
    info!(
        descriptors = descriptor_count,
        artifacts = report.artifacts.len(),
        errors = report.error_count(),
        deferred = report.deferred.len(),
        "discovery pass complete"
    );
    report
}
