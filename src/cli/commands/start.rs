//! Start command implementation.
//!
//! Runs smartqueue as a long-lived service: an empty registry plus, when
//! enabled, the inspection endpoints, until ctrl-c triggers a graceful
//! stop.

use crate::cli::commands::config::load_for_run;
use crate::core::config::ConfigOverrides;
use crate::inspect::server::InspectionServer;
use crate::queue::registry::SmartQueue;
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

/// Start the smartqueue service.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Per-tenant capacity override.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Inspection bind address override (implies enabling inspection).
    #[arg(long)]
    pub bind: Option<String>,
}

/// Initialize the tracing subscriber.
pub(crate) fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Run the start command.
pub async fn run_start(
    args: StartArgs,
    config_path: &Path,
    log_level: Option<String>,
) -> Result<()> {
    let mut config = load_for_run(config_path)?;
    config.apply_overrides(&ConfigOverrides {
        capacity: args.capacity,
        bind: args.bind,
        log_level,
    });
    config.validate()?;
    init_tracing(&config.telemetry.log_level);

    let queue: SmartQueue<serde_json::Value> = SmartQueue::new(config.queue.clone())?;
    tracing::info!(
        capacity = config.queue.capacity,
        poll_interval_ms = config.queue.poll_interval_ms,
        "smartqueue started"
    );

    let server_handle = if config.inspection.enabled {
        let bind = config.inspection.bind_addr()?;
        let server = InspectionServer::new(queue.clone(), bind);
        let shutdown = queue.shutdown_receiver();
        Some(tokio::spawn(server.run(shutdown)))
    } else {
        None
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutdown signal received (SIGINT)");

    queue.stop().await;
    if let Some(handle) = server_handle {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "inspection server stopped with error"),
            Err(e) => tracing::warn!(error = %e, "inspection server task panicked"),
        }
    }
    Ok(())
}
