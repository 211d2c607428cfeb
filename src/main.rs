use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use dockdeck::app::App;
use dockdeck::bridge::{DockerBridge, EventHub};
use dockdeck::config::Config;

/// dockdeck - Docker dashboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "dockdeck")]
#[command(about = "Browse and manage containers, images, volumes and networks")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Docker host to connect to
    #[arg(short = 'H', long, value_name = "HOST")]
    host: Option<String>,

    /// Enable debug logging to file
    #[arg(short, long)]
    debug: bool,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::discover(cli.config.as_deref())?;
    let config = apply_cli_overrides(config, &cli);

    init_logging(&config, &cli);
    info!("Starting dockdeck v{}", env!("CARGO_PKG_VERSION"));

    let hub = EventHub::new();
    let bridge = DockerBridge::connect(config.docker.host.as_deref(), hub.clone()).await?;
    if let Err(e) = bridge.client().ping().await {
        // The UI starts anyway and reports the failure inline
        warn!("Could not reach Docker daemon: {}", e);
    }

    let mut app = App::new(config, Arc::new(bridge), hub);
    app.run().await?;

    info!("dockdeck shutting down gracefully");
    Ok(())
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(host) = &cli.host {
        config.docker.host = Some(host.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.debug {
        config.logging.level = "debug".to_string();
    }
    config
}

/// Logs go to a file; stdout belongs to the TUI
fn init_logging(config: &Config, cli: &Cli) {
    let path = config.logging.file_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("dockdeck={}", config.logging.level));

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init(),
        None => {
            // If can't open log file, disable logging
            tracing_subscriber::fmt().with_env_filter("off").init();
            if cli.debug {
                eprintln!("Could not open log file {}", path.display());
            }
        }
    }
}
