//! # Pipeline Module
//!
//! Discovery, type resolution, grouping and validation: everything between
//! the type graph and the templates.
//!
//! ## Stages
//!
//! 1. **Extract** ([`extract`]) - one marked declaration becomes a
//!    [`HandlerDescriptor`], or an [`ExtractError`] that skips only that
//!    declaration.
//! 2. **Partition** ([`partition`]) - descriptors are keyed into
//!    [`FeatureGroup`]s: intent processors by their base intent, init
//!    processors by the intent feature sharing their state (or, failing that,
//!    by [`InitOnlyGrouping`](crate::config::InitOnlyGrouping)).
//! 3. **Validate** ([`validate_group`]) - at most one init processor and at
//!    most one processor per concrete intent; derives the [`ContractTriple`]
//!    and the feature's visible name.
//!
//! Groups come out sorted by [`FeatureKey`] and descriptors by declaring type,
//! so the same input always produces the same output, whatever order the
//! host discovered the declarations in.

mod descriptor;
mod extract;
mod group;


pub use descriptor::{
    ContractTriple, FeatureGroup, FeatureKey, GeneratedArtifact, HandlerDescriptor, HandlerKind,
    ValidatedFeature,
};
pub use extract::{extract, ExtractError, NotConcreteReason};
pub use group::{group, partition, validate_group, GroupError, Grouping, GroupingOutcome};
