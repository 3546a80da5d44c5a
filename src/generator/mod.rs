//! # Generator Module
//!
//! Turns validated features into Rust dispatcher modules and hands them to a
//! [`CodegenHost`].
//!
//! ## Generated Layout
//!
//! For a feature whose representative processor lives in `app.login`:
//!
//! ```text
//! out/
//! ├── mvigen-deps.json                 # aggregating dependency sets
//! └── app/login/generated/
//!     ├── mod.rs                       # one `pub mod` per dispatcher
//!     └── login_intent_processor_executor.rs
//! ```
//!
//! ## Generated Dispatcher
//!
//! ```rust,ignore
//! pub struct LoginIntentProcessorExecutor {
//!     logout_processor: crate::app::login::LogoutProcessor,
//!     submit_processor: crate::app::login::SubmitProcessor,
//!     login_init: crate::app::login::LoginInit,
//! }
//!
//! impl mvi_runtime::ProcessorExecutor<LoginState, LoginIntent, LoginEffect>
//!     for LoginIntentProcessorExecutor
//! {
//!     fn execute(&self, state: &LoginState, intent: LoginIntent) -> Reduction<..> {
//!         match intent {
//!             LoginIntent::Logout(intent) => /* logout_processor */,
//!             LoginIntent::Submit(intent) => /* submit_processor */,
//!         }
//!     }
//! }
//! ```
//!
//! The `match` has no wildcard arm: an intent variant without a processor is a
//! compile error in the consuming crate, not a runtime fallthrough.
//!
//! ## Template Customization
//!
//! Templates live in `templates/`:
//!
//! - `dispatcher.rs.txt` - one dispatcher per feature
//! - `mod.rs.txt` - module index per generated namespace

mod emit;
mod format;
mod host;
mod naming;
mod templates;


pub use emit::{emit, emit_namespace_modules, render_dispatcher, target_of, RenderedDispatcher};
pub use format::format_files;
pub use host::{CodegenHost, DependencyEntry, FsHost, MemoryHost};
pub use naming::{
    generated_namespace, namespace_dir, package_of, rust_type_path, sanitize_rust_identifier,
    to_snake_case,
};
pub use templates::{BranchEntry, DispatcherTemplateData, ModEntry, ModRsTemplateData};
