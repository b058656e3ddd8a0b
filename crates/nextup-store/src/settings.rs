use crate::store::Store;
use anyhow::{Context, Result};
use chrono::Utc;
use nextup_models::{CustomOrderItem, MediaKind, Settings, DEFAULT_SYNC_INTERVAL_HOURS};
use rusqlite::{params, OptionalExtension};
use tracing::warn;

/// Parse a stored JSON array of collection names. Malformed input is logged
/// and read as an empty list.
pub fn parse_collection_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(names) => names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
        Err(e) => {
            warn!(raw = %raw, error = %e, "Ignoring malformed collection list");
            Vec::new()
        }
    }
}

impl Store {
    pub fn get_settings(&self) -> Result<Settings> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT tv_weight, movie_weight, selected_collection, ignored_tv_collections,
                        ignored_movie_collections, sync_interval_hours
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()
            .context("Failed to read settings")?;

        let Some((tv_weight, movie_weight, selected, ignored_tv, ignored_movie, interval)) = row else {
            return Ok(Settings::default());
        };

        let sync_interval_hours = if interval > 0 {
            u32::try_from(interval).unwrap_or(DEFAULT_SYNC_INTERVAL_HOURS)
        } else {
            DEFAULT_SYNC_INTERVAL_HOURS
        };

        Ok(Settings {
            tv_weight,
            movie_weight,
            selected_collection: selected.filter(|s| !s.trim().is_empty()),
            ignored_tv_collections: parse_collection_list(&ignored_tv),
            ignored_movie_collections: parse_collection_list(&ignored_movie),
            sync_interval_hours,
        })
    }

    pub fn update_settings(&self, settings: &Settings) -> Result<()> {
        let ignored_tv = serde_json::to_string(&settings.ignored_tv_collections)?;
        let ignored_movie = serde_json::to_string(&settings.ignored_movie_collections)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (id, tv_weight, movie_weight, selected_collection,
                                   ignored_tv_collections, ignored_movie_collections, sync_interval_hours)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                tv_weight = excluded.tv_weight,
                movie_weight = excluded.movie_weight,
                selected_collection = excluded.selected_collection,
                ignored_tv_collections = excluded.ignored_tv_collections,
                ignored_movie_collections = excluded.ignored_movie_collections,
                sync_interval_hours = excluded.sync_interval_hours",
            params![
                settings.tv_weight,
                settings.movie_weight,
                settings.selected_collection,
                ignored_tv,
                ignored_movie,
                settings.sync_interval_hours,
            ],
        )
        .context("Failed to update settings")?;
        Ok(())
    }

    pub fn add_custom_order_item(
        &self,
        custom_order: &str,
        kind: MediaKind,
        rating_key: &str,
        title: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO custom_order_items (custom_order, media_kind, rating_key, title, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![custom_order, kind.as_str(), rating_key, title, Utc::now()],
        )
        .with_context(|| format!("Failed to add {} to custom order {}", rating_key, custom_order))?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns false when no item had that id.
    pub fn remove_custom_order_item(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM custom_order_items WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    pub fn list_custom_order_items(&self) -> Result<Vec<CustomOrderItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, custom_order, media_kind, rating_key, title, added_at
             FROM custom_order_items ORDER BY custom_order, id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::with_capacity(rows.len());
        for (id, custom_order, kind, rating_key, title, added_at) in rows {
            let Some(media_kind) = MediaKind::parse(&kind) else {
                warn!(id, kind = %kind, "Skipping custom order item with unknown media kind");
                continue;
            };
            items.push(CustomOrderItem {
                id,
                custom_order,
                media_kind,
                rating_key,
                title,
                added_at,
            });
        }
        Ok(items)
    }

    pub fn is_in_custom_order(&self, kind: MediaKind, rating_key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM custom_order_items WHERE media_kind = ?1 AND rating_key = ?2)",
            params![kind.as_str(), rating_key],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}
