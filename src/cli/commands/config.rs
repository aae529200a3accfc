//! Config command implementation.

use crate::core::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file.
    Validate {
        /// Config file path.
        #[arg(short, long, default_value = "config/smartqueue.toml")]
        config: PathBuf,
    },
    /// Print the effective configuration (file merged with defaults).
    Show {
        /// Config file path.
        #[arg(short, long, default_value = "config/smartqueue.toml")]
        config: PathBuf,
    },
}

/// Run the config command.
pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Validate { config } => validate_config(&config),
        ConfigCommand::Show { config } => show_config(&config),
    }
}

/// Load configuration for a runtime command, falling back to defaults when
/// the file does not exist.
pub(crate) fn load_for_run(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn validate_config(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    Config::from_file(path)?;
    println!("✓ {} is valid", path.display());
    Ok(())
}

fn show_config(path: &Path) -> Result<()> {
    let config = load_for_run(path)?;
    let rendered = toml::to_string_pretty(&config).context("failed to render config")?;
    print!("{}", rendered);
    Ok(())
}
