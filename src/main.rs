use clap::Parser;
use std::path::PathBuf;

use color_probe::config::{load_config, ServiceConfig};
use color_probe::lifecycle::{signals, Shutdown};
use color_probe::net::Listener;
use color_probe::observability::{logging, metrics};
use color_probe::ColorServer;

#[derive(Parser)]
#[command(name = "color-probe")]
#[command(about = "Answers each request with the dominant palette color of the image it names", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address (e.g. 0.0.0.0:3246).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("color-probe v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        block_size = config.reader.block_size,
        reject_threshold = config.classifier.reject_threshold,
        palette_size = config.classifier.palette.len(),
        "Configuration loaded"
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

    let server = ColorServer::from_config(&config)?;
    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_interrupt_handler(shutdown.clone());

    server.run(listener, shutdown_rx).await;
    drop(shutdown);

    tracing::info!("Shutdown complete");
    Ok(())
}
