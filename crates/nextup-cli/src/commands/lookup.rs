use super::context::AppContext;
use crate::output::{styled_table, Output};
use crate::LookupCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use nextup_core::score;
use serde_json::json;

pub async fn run_lookup(cmd: LookupCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    match cmd {
        LookupCommands::Series { name } => lookup_series(&ctx, &name, output).await,
        LookupCommands::Comic { name } => lookup_comic(&ctx, &name, output).await,
    }
}

async fn lookup_series(ctx: &AppContext, name: &str, output: &Output) -> Result<()> {
    let resolver = ctx
        .series_resolver()?
        .ok_or_else(|| eyre!("TVDB is not enabled. Run 'nextup config tvdb' first"))?;

    let matches = resolver
        .scored_search(name)
        .await
        .map_err(|e| eyre!("TVDB search failed: {:#}", e))?;

    if !output.is_human() {
        let rows: Vec<_> = matches
            .iter()
            .map(|m| {
                json!({
                    "tvdb_id": m.item.tvdb_id,
                    "name": m.item.name,
                    "year": m.item.year,
                    "status": m.item.status,
                    "score": m.score,
                })
            })
            .collect();
        output.data(&rows);
        return Ok(());
    }

    if matches.is_empty() {
        output.warn(format!("No TVDB series found for '{}'", name));
        return Ok(());
    }
    let mut table = styled_table(&["Score", "TVDB id", "Name", "Year", "Status"]);
    for m in &matches {
        table.add_row(vec![
            Cell::new(format!("{:.2}", m.score)),
            Cell::new(m.item.tvdb_id.as_deref().unwrap_or("-")),
            Cell::new(&m.item.name),
            Cell::new(m.item.year.as_deref().unwrap_or("-")),
            Cell::new(m.item.status.as_deref().unwrap_or("-")),
        ]);
    }
    output.table(&table);

    if let Some(series) = resolver.find_series(name).await {
        output.success(format!(
            "Best match: {} ({}), status {}",
            series.name,
            series.id,
            series.status.as_deref().unwrap_or("unknown")
        ));
    } else {
        output.warn("No match scored high enough to be used");
    }
    Ok(())
}

async fn lookup_comic(ctx: &AppContext, name: &str, output: &Output) -> Result<()> {
    let client = ctx
        .comicvine_client()?
        .ok_or_else(|| eyre!("ComicVine is not enabled. Run 'nextup config comicvine' first"))?;

    let best = client
        .best_volume(name, score)
        .await
        .map_err(|e| eyre!("ComicVine search failed: {:#}", e))?;

    match best {
        Some((volume, volume_score)) => {
            if output.is_human() {
                let mut table = styled_table(&["Score", "Id", "Name", "Start year", "Issues", "Publisher"]);
                table.add_row(vec![
                    Cell::new(format!("{:.2}", volume_score)),
                    Cell::new(volume.id),
                    Cell::new(&volume.name),
                    Cell::new(volume.start_year.as_deref().unwrap_or("-")),
                    Cell::new(volume.count_of_issues.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())),
                    Cell::new(
                        volume
                            .publisher
                            .as_ref()
                            .and_then(|p| p.name.as_deref())
                            .unwrap_or("-"),
                    ),
                ]);
                output.table(&table);
            } else {
                output.data(&json!({ "volume": volume, "score": volume_score }));
            }
        }
        None => output.warn(format!("No ComicVine volume matched '{}'", name)),
    }
    Ok(())
}
