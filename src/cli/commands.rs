use crate::config::{resolve_config, CodegenConfig};
use crate::diagnostics::{fail_if_errors, print_diagnostics, Diagnostic};
use crate::generator::{format_files, target_of, FsHost, MemoryHost};
use crate::graph::{load_graph, ModelGraph, TypeGraph};
use crate::hot_reload::watch_graph;
use crate::pass::{discover, run_pass, PassReport};
use crate::pipeline::group;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for the MVI dispatcher generator
#[derive(Parser, Debug)]
#[command(name = "mvigen")]
#[command(version, about = "Generate exhaustive MVI intent dispatchers", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a discovery pass and write dispatchers to disk
    Generate {
        /// Path to the type-graph manifest (YAML or JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Output root for generated modules and the dependency manifest
        #[arg(short, long)]
        output: PathBuf,

        /// Path to mvigen.toml
        /// If not provided, will auto-detect alongside the manifest
        #[arg(short, long, env = "MVIGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Keep running and regenerate whenever the manifest changes
        #[arg(long, default_value_t = false)]
        watch: bool,

        /// Run rustfmt over the generated files
        #[arg(long, default_value_t = false)]
        fmt: bool,
    },
    /// Run a discovery pass in memory and report problems without writing
    Check {
        /// Path to the type-graph manifest (YAML or JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Path to mvigen.toml
        #[arg(short, long, env = "MVIGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Exit with error code if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Show only errors (hide warnings)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Print discovered processors, features and the files they would produce
    Inspect {
        /// Path to the type-graph manifest (YAML or JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Path to mvigen.toml
        #[arg(short, long, env = "MVIGEN_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// Parse the process arguments and execute the command.
///
/// # Errors
///
/// See [`run`].
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Execute a parsed command.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest or configuration cannot be loaded
/// - `generate` reports any error-severity diagnostic
/// - rustfmt fails (with `--fmt`)
/// - The watcher cannot be started (with `--watch`)
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            graph,
            output,
            config,
            watch,
            fmt,
        } => {
            let codegen = resolve_config(config.as_deref(), &graph)?;
            let model = load_graph(&graph)?;
            let report = generate_once(&model, &codegen, &output, fmt)?;
            if !watch {
                if report.has_errors() {
                    anyhow::bail!("{} error(s) reported", report.error_count());
                }
                return Ok(());
            }

            println!("👀 Watching {} (Ctrl-C to stop)", graph.display());
            let _watcher = watch_graph(&graph, move |model| {
                if let Err(err) = generate_once(&model, &codegen, &output, fmt) {
                    eprintln!("❌ {err:#}");
                }
            })
            .with_context(|| format!("Failed to watch {}", graph.display()))?;
            loop {
                std::thread::park();
            }
        }
        Commands::Check {
            graph,
            config,
            fail_on_error,
            errors_only,
        } => {
            let codegen = resolve_config(config.as_deref(), &graph)?;
            let model = load_graph(&graph)?;
            let mut host = MemoryHost::new();
            let report = run_pass(&model, &codegen, &mut host);

            let shown: Vec<Diagnostic> = if errors_only {
                report
                    .diagnostics
                    .iter()
                    .filter(|d| d.is_error())
                    .cloned()
                    .collect()
            } else {
                report.diagnostics.clone()
            };
            print_diagnostics(&shown);
            println!(
                "{} dispatcher(s) would be generated, {} declaration(s) deferred",
                report.artifacts.len(),
                report.deferred.len()
            );
            if fail_on_error {
                fail_if_errors(&shown);
            }
            Ok(())
        }
        Commands::Inspect { graph, config } => {
            let codegen = resolve_config(config.as_deref(), &graph)?;
            let model = load_graph(&graph)?;
            print!("{}", inspect(&model, &codegen)?);
            Ok(())
        }
    }
}

/// One pass into `output`, printing diagnostics and optionally formatting.
fn generate_once(
    model: &ModelGraph,
    config: &CodegenConfig,
    output: &Path,
    fmt: bool,
) -> anyhow::Result<PassReport> {
    let mut host = FsHost::new(output, config.deps_manifest.clone());
    let report = run_pass(model, config, &mut host);
    print_diagnostics(&report.diagnostics);
    if fmt {
        format_files(host.written())?;
    }
    info!(
        output = %host.root().display(),
        files = report.files.len(),
        "generation finished"
    );
    Ok(report)
}

/// Human-readable summary of what a pass would see and produce.
///
/// # Errors
///
/// Only fails if formatting into the buffer fails.
pub fn inspect(model: &ModelGraph, config: &CodegenConfig) -> Result<String, std::fmt::Error> {
    use std::fmt::Write;

    let discovery = discover(model, config);
    let mut out = String::new();
    writeln!(
        out,
        "📋 {} marked declaration(s), {} deferred",
        model.marked(&config.marker).len(),
        discovery.deferred.len()
    )?;
    for id in &discovery.deferred {
        writeln!(out, "   ⏳ {id}")?;
    }

    writeln!(out, "\n🔎 Processors:")?;
    for descriptor in &discovery.descriptors {
        let role = match descriptor.event_type() {
            Some(event) => format!("intent {event}"),
            None => "init".to_string(),
        };
        writeln!(
            out,
            "   {} ({role}, state {}, effect {})",
            descriptor.declaring_type, descriptor.state_type, descriptor.effect_type
        )?;
    }

    let outcome = group(discovery.descriptors, config.init_only_grouping);
    writeln!(out, "\n📦 Features:")?;
    for feature in &outcome.features {
        let (_, name, path) = target_of(config, feature);
        writeln!(
            out,
            "   {} -> {name} ({}) [{} processor(s)]",
            feature.group.key,
            path.display(),
            feature.group.descriptors.len()
        )?;
    }

    let problems = discovery.diagnostics.len() + outcome.diagnostics.len();
    if problems > 0 {
        writeln!(out, "\n⚠️  {problems} problem(s); run `mvigen check` for details")?;
    }
    Ok(out)
}
