use super::context::AppContext;
use super::sync_ui::SyncUI;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use nextup_core::PlexSync;
use serde_json::json;
use std::sync::Arc;

pub async fn run_sync(output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let ctx = AppContext::load()?;
    let client = ctx.plex_client()?;
    let store = ctx.open_store()?;

    let ui = Arc::new(SyncUI::new());
    let sync = PlexSync::new(Arc::new(client), store).with_progress(ui.clone());

    let summary = match sync.full_sync().await {
        Ok(summary) => summary,
        Err(e) => {
            ui.abandon();
            return Err(eyre!("Sync operation failed: {:#}", e));
        }
    };
    ui.finish("Library synced");

    if output.is_human() {
        output.success(format!(
            "Sync completed: {} shows, {} seasons, {} episodes, {} movies in {:.1}s",
            summary.total_shows,
            summary.total_seasons,
            summary.total_episodes,
            summary.total_movies,
            summary.duration_ms as f64 / 1000.0
        ));
        if summary.degraded_items > 0 {
            output.warn(format!(
                "{} items were stored without detailed metadata (collections may be missing)",
                summary.degraded_items
            ));
        }
        if summary.child_failures > 0 {
            output.warn(format!("{} items had child relations that could not be stored", summary.child_failures));
        }
    } else {
        output.data(&json!({
            "success": true,
            "summary": summary,
        }));
    }
    Ok(())
}
