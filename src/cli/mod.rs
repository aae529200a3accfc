//! Command-line interface.
//!
//! Unified CLI for smartqueue operations.

pub mod commands;

use clap::{Parser, Subcommand};

/// smartqueue - multi-tenant bounded TTL keyed queue.
#[derive(Parser, Debug)]
#[command(name = "smartqueue")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the smartqueue service.
    Start(commands::StartArgs),
    /// Run the demonstration scenario.
    Demo(commands::DemoArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
}
