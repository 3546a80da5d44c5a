//! # CLI Module
//!
//! Command-line front end for running discovery passes outside a build
//! script.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Run one pass and write dispatchers plus the dependency manifest:
//!
//! ```bash
//! mvigen generate --graph graph.yaml --output src/
//! ```
//!
//! Options:
//! - `--graph <FILE>` - Type-graph manifest (required)
//! - `--output <DIR>` - Output root (required)
//! - `--config <FILE>` - `mvigen.toml`; auto-detected next to the manifest
//! - `--watch` - Re-run the pass whenever the manifest changes
//! - `--fmt` - Run rustfmt over the written files
//!
//! Exits non-zero if any error diagnostic was reported.
//!
//! ### `check`
//!
//! Run a pass in memory and print diagnostics:
//!
//! ```bash
//! mvigen check --graph graph.yaml --fail-on-error
//! ```
//!
//! ### `inspect`
//!
//! List marked declarations, extracted processors and the feature each one
//! lands in:
//!
//! ```bash
//! mvigen inspect --graph graph.yaml
//! ```

mod commands;


pub use commands::{inspect, run, run_cli, Cli, Commands};
