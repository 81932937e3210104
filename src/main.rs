//! CLI for sbexport
//!
//! Exports one or more namespaces to an emulator configuration on stdout:
//!
//! ```text
//! sbexport --cs "<connection string>" [--cs ...] [--filter <regex> ...] [--group <name>]
//! ```

use std::process::ExitCode;

use clap::Parser;
use sbexport::config::load_config;
use sbexport::directory::HttpConnector;
use sbexport::export::generate_config;
use sbexport::normalize::EntityFilter;
use sbexport::utils::{ExportError, Result, logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "sbexport", version)]
#[command(about = "Export namespaces into a messaging emulator configuration")]
struct Cli {
    /// Run exporter for this connection string. Multiple can be provided.
    #[arg(long = "cs", value_name = "CONNECTION_STRING")]
    connections: Vec<String>,

    /// Regex entity name filter. Multiple can be provided; queues and topics
    /// are exported when they match any of them.
    #[arg(long = "filter", value_name = "REGEX")]
    filters: Vec<String>,

    /// Namespace to group all exported namespaces under, since the emulator
    /// only supports one.
    #[arg(long, default_value = "")]
    group: String,

    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Settings file, instead of the optional config/default
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(document) => {
            println!("{document}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[Error] Encountered unexpected error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let settings = load_config(cli.config.as_deref())?;
    logging::init(cli.log_level.as_deref().unwrap_or(&settings.log.level));

    // Bad patterns fail here, before any request is made.
    let filter = EntityFilter::new(&cli.filters)?;
    let connector = HttpConnector::new(settings.client);

    let export = generate_config(&connector, &cli.connections, &filter, &cli.group);
    let config = until_shutdown(export, tokio::signal::ctrl_c()).await?;

    Ok(serde_json::to_string_pretty(&config)?)
}

/// Runs `export` unless `shutdown` fires first. A shutdown listener that fails
/// to install leaves the export running without cancellation.
async fn until_shutdown<T>(
    export: impl Future<Output = Result<T>>,
    shutdown: impl Future<Output = std::io::Result<()>>,
) -> Result<T> {
    tokio::select! {
        result = export => result,
        Ok(()) = shutdown => {
            info!("Shutdown signal received. Abandoning export.");
            Err(ExportError::Cancelled)
        }
    }
}
