use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use xml_pkg_qa::cli::Cli;
use xml_pkg_qa::config::{Config, ConfigManager};
use xml_pkg_qa::orchestrator::{QaSummary, XmlPackageQa};
use xml_pkg_qa::output::Output;
use xml_pkg_qa::reception::InputSource;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {message}");
        return ExitCode::from(2);
    }

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(1);
        }
    };

    init_tracing(&config);
    tracing::debug!("xml-pkg-qa v{} starting", env!("CARGO_PKG_VERSION"));

    let output = Output::new(config.verbosity(), config.output.format.into());
    match run(&cli, config).await {
        Ok(summary) => {
            print!("{}", output.format_summary(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over the configured filter, which wins over verbosity.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, config: Config) -> anyhow::Result<QaSummary> {
    let source = InputSource::from_args(&cli.sources, &config.package.archive_extensions)?;
    let destination = cli.destination.clone();
    tracing::debug!(?source, destination = %destination.display(), "resolved input");

    let summary = tokio::task::spawn_blocking(move || {
        XmlPackageQa::from_config(&config).validate_source(source, &destination)
    })
    .await
    .context("validation task panicked")?
    .with_context(|| format!("failed to process package into {}", cli.destination.display()))?;

    Ok(summary)
}
