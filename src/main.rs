//! smartqueue - unified CLI entrypoint.
//!
//! Usage:
//!   smartqueue start [--config PATH]
//!   smartqueue demo [--inspect] [--capacity N]
//!   smartqueue config validate --config config/smartqueue.toml
//!   smartqueue config show

use anyhow::Result;
use clap::Parser;
use smartqueue::cli::commands::{run_config, run_demo, run_start};
use smartqueue::cli::{Cli, Commands};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine config path - use global --config or default
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/smartqueue.toml"));

    match cli.command {
        Commands::Start(args) => run_start(args, &config_path, cli.log_level).await,
        Commands::Demo(args) => run_demo(args, &config_path, cli.log_level).await,
        Commands::Config(args) => run_config(args),
    }
}
