//! Main entry point for MotionBot.

use anyhow::Result;
use clap::Parser;
use motion_bot::{AppState, MotionBot};
use motion_common::{init_dev_logging, init_logging, LoggingConfig};
use motion_config::ConfigLoader;
use std::path::PathBuf;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Debug-level console logging for development
    #[arg(long, conflicts_with_all = ["log_level", "json_logs"])]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::load(args.config.as_deref())?;

    let _log_guard = if args.dev {
        init_dev_logging()?
    } else {
        init_logging(&LoggingConfig {
            level: args.log_level.unwrap_or_else(|| config.logging.level.clone()),
            json_format: args.json_logs || config.logging.json,
            log_dir: config.logging.dir.clone(),
            include_targets: true,
        })?
    };

    info!("Starting MotionBot v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::load(config).await?;
    MotionBot::new(state).run().await?;

    Ok(())
}
