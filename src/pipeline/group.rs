use super::descriptor::{
    ContractTriple, FeatureGroup, FeatureKey, HandlerDescriptor, ValidatedFeature,
};
use crate::config::InitOnlyGrouping;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::{TypeId, TypeRef};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// A feature-level validation failure. The whole feature is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// More than one initializer resolved to the same feature
    DuplicateInitHandler {
        key: FeatureKey,
        handlers: Vec<TypeId>,
    },
    /// More than one processor bound to the same concrete intent
    AmbiguousEventHandler {
        key: FeatureKey,
        event_type: TypeRef,
        handlers: Vec<TypeId>,
    },
    /// A member's state or effect type differs from the feature's
    ContractMismatch {
        key: FeatureKey,
        handler: TypeId,
        expected: (TypeRef, TypeRef),
        found: (TypeRef, TypeRef),
    },
}

impl GroupError {
    pub fn key(&self) -> &FeatureKey {
        match self {
            GroupError::DuplicateInitHandler { key, .. }
            | GroupError::AmbiguousEventHandler { key, .. }
            | GroupError::ContractMismatch { key, .. } => key,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (kind, suggestion) = match self {
            GroupError::DuplicateInitHandler { .. } => (
                DiagnosticKind::DuplicateInitHandler,
                "Keep exactly one processor and remove the marker from the others",
            ),
            GroupError::AmbiguousEventHandler { .. } => (
                DiagnosticKind::AmbiguousEventHandler,
                "Keep exactly one processor and remove the marker from the others",
            ),
            GroupError::ContractMismatch { .. } => (
                DiagnosticKind::ContractMismatch,
                "Bind every processor of a feature to the same state and effect types",
            ),
        };
        Diagnostic::error(kind, format!("feature:{}", self.key()), self.to_string())
            .with_suggestion(suggestion)
    }
}

fn join_ids(ids: &[TypeId]) -> String {
    ids.iter()
        .map(TypeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::DuplicateInitHandler { key, handlers } => write!(
                f,
                "feature {key} has {} init processors: {}",
                handlers.len(),
                join_ids(handlers)
            ),
            GroupError::AmbiguousEventHandler {
                key,
                event_type,
                handlers,
            } => write!(
                f,
                "feature {key} has {} processors for intent {event_type}: {}",
                handlers.len(),
                join_ids(handlers)
            ),
            GroupError::ContractMismatch {
                key,
                handler,
                expected,
                found,
            } => write!(
                f,
                "{handler} in feature {key} uses state {} and effect {}, expected {} and {}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for GroupError {}

/// Partition of a descriptor batch into feature groups.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Sorted by key; descriptors inside a group sorted by declaring type
    pub groups: Vec<FeatureGroup>,
    pub warnings: Vec<Diagnostic>,
}

/// Partition descriptors into feature groups.
///
/// Intent processors are keyed by their base intent. An init processor joins
/// the intent feature whose processors share its state type; if there is
/// none, it is keyed according to `init_only`.
pub fn partition(descriptors: Vec<HandlerDescriptor>, init_only: InitOnlyGrouping) -> Grouping {
    let mut buckets: BTreeMap<FeatureKey, Vec<HandlerDescriptor>> = BTreeMap::new();
    let mut features_by_state: BTreeMap<TypeRef, BTreeSet<FeatureKey>> = BTreeMap::new();
    let mut inits = Vec::new();
    let mut warnings = Vec::new();

    for descriptor in descriptors {
        match descriptor.base_event_type() {
            Some(base) => {
                let key = FeatureKey(base.name.clone());
                features_by_state
                    .entry(descriptor.state_type.clone())
                    .or_default()
                    .insert(key.clone());
                buckets.entry(key).or_default().push(descriptor);
            }
            None => inits.push(descriptor),
        }
    }

    for descriptor in inits {
        let key = match features_by_state.get(&descriptor.state_type) {
            Some(candidates) => {
                let mut iter = candidates.iter();
                let first = iter.next().cloned();
                if candidates.len() > 1 {
                    let others: Vec<_> = iter.map(FeatureKey::as_str).collect();
                    warn!(
                        declaration = %descriptor.declaring_type,
                        "init processor matches several intent features"
                    );
                    warnings.push(Diagnostic::warning(
                        DiagnosticKind::AmbiguousInitFeature,
                        format!("declaration:{}", descriptor.declaring_type),
                        format!(
                            "state {} is shared by several intent features; attached to {} (also: {})",
                            descriptor.state_type,
                            first.as_ref().map(FeatureKey::as_str).unwrap_or_default(),
                            others.join(", ")
                        ),
                    ));
                }
                first
            }
            None => None,
        };
        let key = key.unwrap_or_else(|| match init_only {
            InitOnlyGrouping::DeclaringType => FeatureKey(descriptor.declaring_type.0.clone()),
            InitOnlyGrouping::StateType => FeatureKey(descriptor.state_type.name.clone()),
        });
        buckets.entry(key).or_default().push(descriptor);
    }

    let groups = buckets
        .into_iter()
        .map(|(key, mut descriptors)| {
            descriptors.sort_by(|a, b| a.declaring_type.cmp(&b.declaring_type));
            debug!(feature = %key, members = descriptors.len(), "feature group");
            FeatureGroup { key, descriptors }
        })
        .collect();
    Grouping { groups, warnings }
}

/// Enforce multiplicity rules and derive the feature's shared contract.
///
/// # Errors
///
/// Returns every rule the group breaks; any error means no dispatcher is
/// emitted for it.
pub fn validate_group(group: FeatureGroup) -> Result<ValidatedFeature, Vec<GroupError>> {
    let mut errors = Vec::new();

    let inits: Vec<TypeId> = group
        .init_handlers()
        .map(|d| d.declaring_type.clone())
        .collect();
    if inits.len() > 1 {
        errors.push(GroupError::DuplicateInitHandler {
            key: group.key.clone(),
            handlers: inits,
        });
    }

    let mut by_event: BTreeMap<&TypeRef, Vec<TypeId>> = BTreeMap::new();
    for descriptor in group.event_handlers() {
        if let Some(event_type) = descriptor.event_type() {
            by_event
                .entry(event_type)
                .or_default()
                .push(descriptor.declaring_type.clone());
        }
    }
    for (event_type, handlers) in by_event {
        if handlers.len() > 1 {
            errors.push(GroupError::AmbiguousEventHandler {
                key: group.key.clone(),
                event_type: event_type.clone(),
                handlers,
            });
        }
    }

    let Some(representative) = group.representative() else {
        return Err(errors);
    };
    let expected = (
        representative.state_type.clone(),
        representative.effect_type.clone(),
    );
    for descriptor in &group.descriptors {
        if descriptor.state_type != expected.0 || descriptor.effect_type != expected.1 {
            errors.push(GroupError::ContractMismatch {
                key: group.key.clone(),
                handler: descriptor.declaring_type.clone(),
                expected: expected.clone(),
                found: (
                    descriptor.state_type.clone(),
                    descriptor.effect_type.clone(),
                ),
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    let base_event = representative.base_event_type().cloned();
    let visible_name = match &base_event {
        Some(base) => base.simple_name().to_string(),
        None => representative.state_type.simple_name().to_string(),
    };
    let triple = ContractTriple {
        state_type: representative.state_type.clone(),
        event_type: base_event,
        effect_type: representative.effect_type.clone(),
    };
    let package = representative.package.clone();
    Ok(ValidatedFeature {
        group,
        triple,
        visible_name,
        package,
    })
}

/// Result of grouping and validating one pass's descriptors.
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    pub features: Vec<ValidatedFeature>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Partition and validate a descriptor batch.
pub fn group(descriptors: Vec<HandlerDescriptor>, init_only: InitOnlyGrouping) -> GroupingOutcome {
    let Grouping { groups, warnings } = partition(descriptors, init_only);
    let mut outcome = GroupingOutcome {
        features: Vec::with_capacity(groups.len()),
        diagnostics: warnings,
    };
    for group in groups {
        match validate_group(group) {
            Ok(feature) => outcome.features.push(feature),
            Err(errors) => outcome
                .diagnostics
                .extend(errors.iter().map(GroupError::to_diagnostic)),
        }
    }
    outcome
}
