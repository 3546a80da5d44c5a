use mvigen::cli::run_cli;
use mvigen::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging_with_config(&LogConfig::from_env())?;
    run_cli()
}
