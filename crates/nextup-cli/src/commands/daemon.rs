use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use nextup_config::container_base_path;
use nextup_core::{BackgroundSync, PlexSync, SyncStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

// Docker/Podman indicators
fn is_container() -> bool {
    std::path::Path::new("/.dockerenv").exists()
        || container_base_path().exists()
        || std::fs::read_to_string("/proc/self/cgroup")
            .map(|s| s.contains("docker") || s.contains("containerd") || s.contains("podman"))
            .unwrap_or(false)
}

pub async fn run_daemon(no_startup_sync: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let client = ctx.plex_client()?;
    let store = ctx.open_store()?;

    let scheduler_config = ctx.config.scheduler_or_default();
    let sync_on_start = scheduler_config.run_on_startup && !no_startup_sync;

    let job = Arc::new(PlexSync::new(Arc::new(client), store.clone()));
    let scheduler = BackgroundSync::new(job, store)
        .with_sync_on_start(sync_on_start)
        .with_fallback_interval(scheduler_config.default_interval_hours);

    scheduler
        .start()
        .await
        .map_err(|e| eyre!("Failed to start scheduler: {}", e))?;

    info!(
        operation = "daemon_started",
        container = is_container(),
        sync_on_start,
        "Daemon running, press Ctrl-C to stop"
    );
    output.info("Daemon running. Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for shutdown signal: {}", e))?;

    info!(operation = "daemon_shutdown", "Shutdown requested");
    scheduler.stop().await;
    report_status(&scheduler.get_sync_status().await, output);
    Ok(())
}

fn report_status(status: &SyncStatus, output: &Output) {
    if !output.is_human() {
        output.data(&json!({ "type": "status", "status": status }));
        return;
    }

    match status.last_sync_at {
        Some(at) => output.info(format!("Last successful sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))),
        None => output.info("No successful sync during this run"),
    }
    if let Some(error) = &status.last_error {
        output.warn(format!("Last sync error: {}", error));
    }
    output.success("Daemon stopped");
}
