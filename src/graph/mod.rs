//! # Type Graph Module
//!
//! The pipeline never inspects source code itself. Everything it knows about
//! the program comes through the [`TypeGraph`] trait: which declarations carry
//! the discovery marker, which of them are resolvable this pass, and how type
//! arguments flow through a supertype chain.
//!
//! [`ModelGraph`] is the in-memory implementation used by the CLI. It is
//! loaded from a YAML or JSON manifest:
//!
//! ```yaml
//! declarations:
//!   - name: com.example.login.LoginIntent
//!     kind: interface
//!   - name: com.example.login.LoginIntent.Submit
//!     kind: class
//!     supertypes: [com.example.login.LoginIntent]
//!   - name: com.example.login.SubmitProcessor
//!     kind: class
//!     annotations: [mvi.Processor]
//!     file: src/login/submit.kt
//!     supertypes:
//!       - "mvi.IntentProcessor<com.example.login.LoginState, com.example.login.LoginIntent.Submit, com.example.login.LoginEffect>"
//! ```
//!
//! ## Generic Argument Resolution
//!
//! [`TypeGraph::supertype_closure`] substitutes type arguments at every step,
//! so a processor extending `BaseProcessor<Submit>` where
//! `BaseProcessor<E> : IntentProcessor<LoginState, E, LoginEffect>` yields
//! `IntentProcessor<LoginState, Submit, LoginEffect>`.

mod facade;
mod load;
mod types;

#[cfg(test)]
mod tests;

pub use facade::{ModelGraph, TypeGraph};
pub use load::load_graph;
pub use types::{
    default_package, DeclKind, Declaration, TypeId, TypeRef, TypeRefParseError,
};
