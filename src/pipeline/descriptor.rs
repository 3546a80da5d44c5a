use crate::graph::{TypeId, TypeRef};
use std::fmt;
use std::path::PathBuf;

/// Which recognized contract a handler implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKind {
    /// Bound to one concrete event subtype.
    Event {
        event_type: TypeRef,
        /// First declared supertype of `event_type`
        base_event_type: TypeRef,
    },
    /// Single-shot initializer, no event.
    Init,
}

/// Normalized view of one marked declaration.
///
/// Built fresh every pass and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    pub declaring_type: TypeId,
    pub kind: HandlerKind,
    pub state_type: TypeRef,
    pub effect_type: TypeRef,
    /// Package of the bound event type (or of the state type for initializers)
    pub package: String,
    pub source: Option<PathBuf>,
}

impl HandlerDescriptor {
    pub fn is_init(&self) -> bool {
        matches!(self.kind, HandlerKind::Init)
    }

    pub fn declaring_type_ref(&self) -> TypeRef {
        TypeRef::named(self.declaring_type.as_str())
    }

    pub fn event_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            HandlerKind::Event { event_type, .. } => Some(event_type),
            HandlerKind::Init => None,
        }
    }

    pub fn base_event_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            HandlerKind::Event {
                base_event_type, ..
            } => Some(base_event_type),
            HandlerKind::Init => None,
        }
    }
}

/// Grouping identity of a feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureKey(pub String);

impl FeatureKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptors sharing one feature key, ordered by declaring type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup {
    pub key: FeatureKey,
    pub descriptors: Vec<HandlerDescriptor>,
}

impl FeatureGroup {
    pub fn event_handlers(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.descriptors.iter().filter(|d| !d.is_init())
    }

    pub fn init_handlers(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.descriptors.iter().filter(|d| d.is_init())
    }

    /// First event handler if any, else the first initializer.
    pub fn representative(&self) -> Option<&HandlerDescriptor> {
        self.event_handlers()
            .next()
            .or_else(|| self.init_handlers().next())
    }
}

/// Types the generated dispatcher's interface exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTriple {
    pub state_type: TypeRef,
    /// Base event type; absent for initializer-only features
    pub event_type: Option<TypeRef>,
    pub effect_type: TypeRef,
}

/// A feature that passed validation and is ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFeature {
    pub group: FeatureGroup,
    pub triple: ContractTriple,
    /// Simple name of the base event, or of the state for initializer-only features
    pub visible_name: String,
    /// Package the generated namespace is derived from
    pub package: String,
}

impl ValidatedFeature {
    pub fn init_handler(&self) -> Option<&HandlerDescriptor> {
        self.group.init_handlers().next()
    }
}

/// Record of one written dispatcher, used only for dependency registration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneratedArtifact {
    pub namespace: String,
    pub name: String,
    pub source_descriptors: Vec<TypeId>,
}
