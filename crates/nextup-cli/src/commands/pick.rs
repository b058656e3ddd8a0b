use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use nextup_core::{SelectionEngine, SelectionError};

pub async fn run_pick(tv: bool, movie: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;
    let resolver = ctx.series_resolver()?;
    if resolver.is_none() {
        tracing::debug!("TVDB not configured, series status check disabled");
    }

    let engine = SelectionEngine::new(store, resolver).with_max_attempts(ctx.config.selection.max_attempts);
    let result = if tv {
        engine.find_new_series().await
    } else if movie {
        engine.find_new_movie().await
    } else {
        engine.pick().await
    };

    match result {
        Ok(rec) => {
            output.recommendation(&rec);
            Ok(())
        }
        Err(SelectionError::Empty(kind)) => Err(eyre!(
            "No unplayed {} in the local library. Run 'nextup sync' first",
            kind
        )),
        Err(e) => Err(eyre!("{:#}", e)),
    }
}
