use super::context::AppContext;
use crate::output::{styled_table, Output};
use crate::{KindArg, OrderCommands};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use nextup_models::MediaKind;
use nextup_store::Store;
use serde_json::json;

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Episode => MediaKind::Episode,
        }
    }
}

pub fn run_order(cmd: OrderCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;

    match cmd {
        OrderCommands::Add {
            order,
            kind,
            rating_key,
            title,
        } => {
            let kind = MediaKind::from(kind);
            let title = match title {
                Some(title) => title,
                None => library_title(&store, kind, &rating_key)?,
            };
            let id = store
                .add_custom_order_item(&order, kind, &rating_key, &title)
                .map_err(|e| eyre!("{:#}", e))?;
            if output.is_human() {
                output.success(format!("Added '{}' to {} (id {})", title, order, id));
            } else {
                output.data(&json!({ "success": true, "id": id }));
            }
        }
        OrderCommands::Remove { id } => {
            let removed = store
                .remove_custom_order_item(id)
                .map_err(|e| eyre!("{:#}", e))?;
            if !removed {
                return Err(eyre!("No custom order entry with id {}", id));
            }
            output.success(format!("Removed entry {}", id));
        }
        OrderCommands::List => {
            let items = store
                .list_custom_order_items()
                .map_err(|e| eyre!("{:#}", e))?;
            if !output.is_human() {
                output.data(&items);
            } else if items.is_empty() {
                output.info("No custom order entries");
            } else {
                let mut table = styled_table(&["Id", "Order", "Kind", "Rating key", "Title"]);
                for item in &items {
                    table.add_row(vec![
                        Cell::new(item.id),
                        Cell::new(&item.custom_order),
                        Cell::new(item.media_kind.as_str()),
                        Cell::new(&item.rating_key),
                        Cell::new(&item.title),
                    ]);
                }
                output.table(&table);
            }
        }
    }
    Ok(())
}

/// Title from the synced library, so entries read well in listings.
fn library_title(store: &Store, kind: MediaKind, rating_key: &str) -> Result<String> {
    let title = match kind {
        MediaKind::Movie => store
            .get_movie(rating_key)
            .map_err(|e| eyre!("{:#}", e))?
            .map(|m| m.title),
        MediaKind::Episode => store
            .get_episode(rating_key)
            .map_err(|e| eyre!("{:#}", e))?
            .map(|e| format!("{} - S{:02}E{:02} - {}", e.show_title, e.season_index, e.episode_index, e.title)),
    };
    title.ok_or_else(|| eyre!("No {} with rating key {} in the library; pass --title", kind.as_str(), rating_key))
}
