//! logrelay service binary.
//!
//! Loads configuration, builds the log core, registers configured webhooks
//! and serves the logging API until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use logrelay::config::{load_config, LoadedConfig};
use logrelay::lifecycle::{signals, startup};
use logrelay::observability::{logging, metrics};
use logrelay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "logrelay", version, about = "Logging core with retrieval API")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "logrelay.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let LoadedConfig { config, notices } = load_config(&cli.config)?;

    logging::init_tracing(&config.observability);
    for notice in &notices {
        notice.log();
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        log_file = %config.logging.log_file,
        "logrelay starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let logger = startup::bootstrap(&config)?;
    logger.info(format_args!("Logger initialized at {}", config.logging.log_file))?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    let server = HttpServer::new(&config.server, logger.clone());
    let served = server.run(listener, shutdown).await;

    logger.shutdown().await?;
    tracing::info!("Shutdown complete");
    Ok(served?)
}
