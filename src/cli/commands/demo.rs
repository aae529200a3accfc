//! Demo command implementation.
//!
//! Runs a short scripted scenario against a live queue: entries enqueued
//! across tenants with mixed TTLs, a lookup, a silent removal, then waits
//! long enough for the remaining deadlines to pass so the expiry workers
//! deliver their callbacks. With `--inspect` the inspection endpoints stay
//! up afterwards until ctrl-c.

use crate::cli::commands::config::load_for_run;
use crate::cli::commands::start::init_tracing;
use crate::core::config::ConfigOverrides;
use crate::inspect::server::InspectionServer;
use crate::queue::registry::SmartQueue;
use crate::store::entry::ExpiryCallback;
use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Run the demonstration scenario.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Per-tenant capacity override.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Keep the inspection endpoints up after the scenario, until ctrl-c.
    #[arg(long)]
    pub inspect: bool,

    /// Inspection bind address override (implies --inspect).
    #[arg(long)]
    pub bind: Option<String>,
}

/// Run the demo command.
pub async fn run_demo(
    args: DemoArgs,
    config_path: &Path,
    log_level: Option<String>,
) -> Result<()> {
    let mut config = load_for_run(config_path)?;
    config.apply_overrides(&ConfigOverrides {
        capacity: args.capacity,
        bind: args.bind.clone(),
        log_level,
    });
    config.validate()?;
    init_tracing(&config.telemetry.log_level);

    let queue: SmartQueue<serde_json::Value> = SmartQueue::new(config.queue.clone())?;

    let serve_inspection = args.inspect || args.bind.is_some() || config.inspection.enabled;
    let server_handle = if serve_inspection {
        let bind = config.inspection.bind_addr()?;
        let server = InspectionServer::new(queue.clone(), bind);
        let shutdown = queue.shutdown_receiver();
        Some(tokio::spawn(server.run(shutdown)))
    } else {
        None
    };

    let on_expire: ExpiryCallback = Arc::new(|tenant: &str, key: i64| {
        println!("  expired: tenant={} key={} (cancel event fired)", tenant, key);
    });

    println!("enqueue t0001/121 = \"apple\"   (ttl 6s)");
    queue.enqueue(
        "t0001",
        121,
        json!("apple"),
        on_expire.clone(),
        Duration::from_secs(6),
    );
    println!("enqueue t0002/124 = \"banana\"  (ttl 15s)");
    queue.enqueue(
        "t0002",
        124,
        json!("banana"),
        on_expire.clone(),
        Duration::from_secs(15),
    );
    println!("enqueue t0001/125 = \"avocado\" (ttl 15s)");
    queue.enqueue(
        "t0001",
        125,
        json!("avocado"),
        on_expire.clone(),
        Duration::from_secs(15),
    );

    println!("pop t0001/121        -> {:?}", queue.pop("t0001", 121));
    queue.remove("t0001", 121);
    println!("remove t0001/121     (silent; no callback will fire for it)");

    println!("sleeping 6s...");
    tokio::time::sleep(Duration::from_secs(6)).await;

    println!("pop t0001/121        -> {:?}", queue.pop("t0001", 121));
    println!("pop t0002/124        -> {:?}", queue.pop("t0002", 124));

    println!("waiting for the remaining entries to expire...");
    tokio::time::sleep(Duration::from_secs(10)).await;

    if server_handle.is_some() {
        println!(
            "inspection serving on http://{} - press ctrl-c to exit",
            config.inspection.bind
        );
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
    }

    queue.stop().await;
    if let Some(handle) = server_handle {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "inspection server stopped with error"),
            Err(e) => tracing::warn!(error = %e, "inspection server task panicked"),
        }
    }

    println!("done");
    Ok(())
}
