//! # Diagnostics Module
//!
//! Every failure the pipeline detects becomes a [`Diagnostic`] handed to the
//! host. Nothing is swallowed: an error-severity diagnostic fails the build,
//! and the message names the offending declarations or feature.
//!
//! ## Kinds
//!
//! | Kind | Scope | Effect |
//! |------|-------|--------|
//! | `handler_contract_not_found` | declaration | declaration skipped |
//! | `intent_type_not_concrete` | declaration | declaration skipped |
//! | `event_hierarchy_not_found` | declaration | declaration skipped |
//! | `duplicate_init_handler` | feature | no dispatcher emitted |
//! | `ambiguous_event_handler` | feature | no dispatcher emitted |
//! | `artifact_path_collision` | feature | no dispatcher emitted |
//! | `emission_io_failure` | feature | dispatcher missing, other features unaffected |

use std::fmt;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Fails the host build
    Error,
    /// Reported, build continues
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
        }
    }
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    HandlerContractNotFound,
    IntentTypeNotConcrete,
    EventHierarchyNotFound,
    DuplicateInitHandler,
    AmbiguousEventHandler,
    ArtifactPathCollision,
    EmissionIoFailure,
    /// Members of one feature disagree on state or effect type
    ContractMismatch,
    /// An initializer could belong to more than one event feature
    AmbiguousInitFeature,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::HandlerContractNotFound => "handler_contract_not_found",
            DiagnosticKind::IntentTypeNotConcrete => "intent_type_not_concrete",
            DiagnosticKind::EventHierarchyNotFound => "event_hierarchy_not_found",
            DiagnosticKind::DuplicateInitHandler => "duplicate_init_handler",
            DiagnosticKind::AmbiguousEventHandler => "ambiguous_event_handler",
            DiagnosticKind::ArtifactPathCollision => "artifact_path_collision",
            DiagnosticKind::EmissionIoFailure => "emission_io_failure",
            DiagnosticKind::ContractMismatch => "contract_mismatch",
            DiagnosticKind::AmbiguousInitFeature => "ambiguous_init_feature",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found during a discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Offending declaration or feature (e.g. "declaration:app.Foo", "feature:app.LoginIntent")
    pub location: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(
        kind: DiagnosticKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity: Severity::Error,
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(kind, location, message)
        }
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.location, self.kind, self.message
        )
    }
}

/// Print diagnostics to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("✅ No problems found");
        return;
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    eprintln!(
        "\n❌ {} problem(s) found ({} error(s), {} warning(s)):\n",
        diagnostics.len(),
        errors,
        diagnostics.len() - errors
    );
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
        if let Some(suggestion) = &diagnostic.suggestion {
            eprintln!("    💡 {suggestion}");
        }
    }
    eprintln!();
}

/// Exit with a non-zero status if any diagnostic is an error
pub fn fail_if_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        eprintln!("Fix the processor declarations above; no dispatcher was generated for them.\n");
        std::process::exit(1);
    }
}
