use super::descriptor::{HandlerDescriptor, HandlerKind};
use crate::config::{CodegenConfig, ContractShape, SlotRef};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::{default_package, DeclKind, Declaration, TypeGraph, TypeId, TypeRef};
use std::fmt;
use tracing::debug;

/// Why a bound event type cannot be routed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotConcreteReason {
    /// Still an unbound type parameter after walking the supertype chain
    TypeParameter,
    /// No declaration with that name is visible
    Unresolved,
    /// Resolved, but to an interface, primitive or similar
    Kind(DeclKind),
}

impl fmt::Display for NotConcreteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotConcreteReason::TypeParameter => write!(f, "it is an unbound type parameter"),
            NotConcreteReason::Unresolved => write!(f, "it does not resolve to a declaration"),
            NotConcreteReason::Kind(kind) => write!(f, "it is a {kind}, not a class or object"),
        }
    }
}

/// Failure to turn a marked declaration into a [`HandlerDescriptor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Neither the event nor the init contract is among the supertypes
    ContractNotFound { declaration: TypeId },
    /// The contract is implemented raw, without an argument for `slot`
    IncompleteBinding {
        declaration: TypeId,
        contract: String,
        slot: String,
    },
    /// The event slot is bound to something that is not a concrete declaration
    IntentTypeNotConcrete {
        declaration: TypeId,
        event_type: TypeRef,
        reason: NotConcreteReason,
    },
    /// The event type declares no supertype, so there is no base event
    EventHierarchyNotFound {
        declaration: TypeId,
        event_type: TypeRef,
    },
}

impl ExtractError {
    pub fn declaration(&self) -> &TypeId {
        match self {
            ExtractError::ContractNotFound { declaration }
            | ExtractError::IncompleteBinding { declaration, .. }
            | ExtractError::IntentTypeNotConcrete { declaration, .. }
            | ExtractError::EventHierarchyNotFound { declaration, .. } => declaration,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ExtractError::ContractNotFound { .. } | ExtractError::IncompleteBinding { .. } => {
                DiagnosticKind::HandlerContractNotFound
            }
            ExtractError::IntentTypeNotConcrete { .. } => DiagnosticKind::IntentTypeNotConcrete,
            ExtractError::EventHierarchyNotFound { .. } => DiagnosticKind::EventHierarchyNotFound,
        }
    }

    pub fn to_diagnostic(&self, config: &CodegenConfig) -> Diagnostic {
        let diagnostic = Diagnostic::error(
            self.kind(),
            format!("declaration:{}", self.declaration()),
            self.to_string(),
        );
        match self {
            ExtractError::ContractNotFound { .. } => diagnostic.with_suggestion(format!(
                "Implement {} or {}, or remove the @{} marker",
                config.event_contract.name,
                config.init_contract.name,
                config.marker
            )),
            ExtractError::EventHierarchyNotFound { event_type, .. } => diagnostic.with_suggestion(
                format!("Declare the feature's base intent as the first supertype of {event_type}"),
            ),
            _ => diagnostic,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ContractNotFound { declaration } => write!(
                f,
                "{declaration} is marked as a processor but implements no recognized processor contract"
            ),
            ExtractError::IncompleteBinding {
                declaration,
                contract,
                slot,
            } => write!(
                f,
                "{declaration} implements {contract} without a type argument for slot '{slot}'"
            ),
            ExtractError::IntentTypeNotConcrete {
                declaration,
                event_type,
                reason,
            } => write!(
                f,
                "{declaration} handles intent type {event_type}, but {reason}"
            ),
            ExtractError::EventHierarchyNotFound {
                declaration,
                event_type,
            } => write!(
                f,
                "{declaration} handles intent type {event_type}, which declares no base intent"
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Turn one marked declaration into a handler descriptor.
///
/// The initializer contract takes precedence: if it appears anywhere in the
/// supertype closure the declaration is an initializer, whatever else it
/// implements.
///
/// # Errors
///
/// See [`ExtractError`]; each failure is local to this declaration.
pub fn extract<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &CodegenConfig,
    decl: &Declaration,
) -> Result<HandlerDescriptor, ExtractError> {
    let closure = graph.supertype_closure(decl);
    let find = |contract: &ContractShape| closure.iter().find(|t| t.name == contract.name);

    if let Some(binding) = find(&config.init_contract) {
        let descriptor = init_descriptor(graph, &config.init_contract, decl, binding)?;
        debug!(declaration = %decl.id, state = %descriptor.state_type, "init processor");
        return Ok(descriptor);
    }
    if let Some(binding) = find(&config.event_contract) {
        let descriptor = event_descriptor(graph, &config.event_contract, decl, binding)?;
        debug!(
            declaration = %decl.id,
            event = ?descriptor.event_type().map(|t| t.to_string()),
            "intent processor"
        );
        return Ok(descriptor);
    }
    Err(ExtractError::ContractNotFound {
        declaration: decl.id.clone(),
    })
}

fn slot<G: TypeGraph + ?Sized>(
    graph: &G,
    contract: &ContractShape,
    decl: &Declaration,
    binding: &TypeRef,
    slot: &SlotRef,
) -> Result<TypeRef, ExtractError> {
    graph
        .slot_argument(binding, &slot.param, slot.position)
        .ok_or_else(|| ExtractError::IncompleteBinding {
            declaration: decl.id.clone(),
            contract: contract.name.clone(),
            slot: slot.param.clone(),
        })
}

fn init_descriptor<G: TypeGraph + ?Sized>(
    graph: &G,
    contract: &ContractShape,
    decl: &Declaration,
    binding: &TypeRef,
) -> Result<HandlerDescriptor, ExtractError> {
    let state_type = slot(graph, contract, decl, binding, &contract.state)?;
    let effect_type = slot(graph, contract, decl, binding, &contract.effect)?;
    let package = graph
        .declaration(&state_type.name)
        .map(|d| d.package.clone())
        .unwrap_or_else(|| default_package(&state_type.name));
    Ok(HandlerDescriptor {
        declaring_type: decl.id.clone(),
        kind: HandlerKind::Init,
        state_type,
        effect_type,
        package,
        source: decl.file.clone(),
    })
}

fn event_descriptor<G: TypeGraph + ?Sized>(
    graph: &G,
    contract: &ContractShape,
    decl: &Declaration,
    binding: &TypeRef,
) -> Result<HandlerDescriptor, ExtractError> {
    let state_type = slot(graph, contract, decl, binding, &contract.state)?;
    let effect_type = slot(graph, contract, decl, binding, &contract.effect)?;
    let event_slot = contract
        .event
        .as_ref()
        .ok_or_else(|| ExtractError::IncompleteBinding {
            declaration: decl.id.clone(),
            contract: contract.name.clone(),
            slot: "event".to_string(),
        })?;
    let event_type = slot(graph, contract, decl, binding, event_slot)?;

    let not_concrete = |reason| ExtractError::IntentTypeNotConcrete {
        declaration: decl.id.clone(),
        event_type: event_type.clone(),
        reason,
    };
    if event_type.param {
        return Err(not_concrete(NotConcreteReason::TypeParameter));
    }
    let event_decl = graph
        .declaration(&event_type.name)
        .ok_or_else(|| not_concrete(NotConcreteReason::Unresolved))?;
    if !event_decl.kind.is_concrete() {
        return Err(not_concrete(NotConcreteReason::Kind(event_decl.kind)));
    }

    let base_event_type = event_decl.supertypes.first().cloned().ok_or_else(|| {
        ExtractError::EventHierarchyNotFound {
            declaration: decl.id.clone(),
            event_type: event_type.clone(),
        }
    })?;

    Ok(HandlerDescriptor {
        declaring_type: decl.id.clone(),
        package: event_decl.package.clone(),
        kind: HandlerKind::Event {
            event_type,
            base_event_type,
        },
        state_type,
        effect_type,
        source: decl.file.clone(),
    })
}
