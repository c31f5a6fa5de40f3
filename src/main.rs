//! chunkpin - headless driver for the chunk ticket lifecycle manager.

mod config;
mod sim;

use anyhow::Result;
use config::PinConfig;
use std::{env, path::PathBuf};
use tracing::{info, warn};

/// Parsed command-line options.
#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    ticks: Option<u64>,
    event_log: Option<PathBuf>,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Self {
        let mut options = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = args.next().map(PathBuf::from),
                "--ticks" => {
                    options.ticks = args.next().and_then(|value| match value.parse() {
                        Ok(ticks) => Some(ticks),
                        Err(_) => {
                            warn!("--ticks expects an integer, got `{value}`");
                            None
                        }
                    })
                }
                "--event-log" => options.event_log = args.next().map(PathBuf::from),
                other => warn!("ignoring unknown argument `{other}`"),
            }
        }
        options
    }
}

fn main() -> Result<()> {
    // Initialize tracing with INFO level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting chunkpin v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = match &cli.config {
        Some(path) => PinConfig::load_from_path(path),
        None => PinConfig::load(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if cli.event_log.is_some() {
        config.event_log = cli.event_log;
    }

    let report = sim::run(&config)?;
    info!(
        ticks = report.ticks,
        registered = report.registered,
        resident = report.resident,
        "chunkpin run complete"
    );
    Ok(())
}
