use crate::schema::CHILD_TABLES;
use crate::store::Store;
use anyhow::{Context, Result};
use nextup_models::{ChildRelations, ParentRef};
use rusqlite::{params, Transaction};

impl Store {
    /// Replace every child relation row of `parent` with `relations`.
    ///
    /// Delete and insert run in one transaction, so readers see either the old
    /// set or the new one, never an empty window in between.
    pub fn replace_children(&self, parent: &ParentRef, relations: &ChildRelations) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let column = parent.column();
        let key = parent.rating_key();

        for table in CHILD_TABLES {
            tx.execute(&format!("DELETE FROM {} WHERE {} = ?1", table, column), [key])
                .with_context(|| format!("Failed to clear {} for {}", table, key))?;
        }

        for (table, tags) in [
            ("directors", &relations.directors),
            ("genres", &relations.genres),
            ("producers", &relations.producers),
            ("writers", &relations.writers),
            ("countries", &relations.countries),
        ] {
            insert_tags(&tx, table, column, key, tags)?;
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO roles ({}, tag, role, thumb) VALUES (?1, ?2, ?3, ?4)",
                column
            ))?;
            for role in &relations.roles {
                stmt.execute(params![key, role.tag, role.role, role.thumb])?;
            }
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO ratings ({}, image, value, rating_type) VALUES (?1, ?2, ?3, ?4)",
                column
            ))?;
            for rating in &relations.ratings {
                stmt.execute(params![key, rating.image, rating.value, rating.rating_type])?;
            }
        }

        {
            let mut stmt = tx.prepare(&format!("INSERT INTO guids ({}, guid) VALUES (?1, ?2)", column))?;
            for guid in &relations.guids {
                stmt.execute(params![key, guid])?;
            }
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO media ({}, media_id, duration, bitrate, width, height, aspect_ratio,
                     audio_channels, audio_codec, video_codec, video_resolution, video_frame_rate, container)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                column
            ))?;
            for media in &relations.media {
                stmt.execute(params![
                    key,
                    media.media_id,
                    media.duration,
                    media.bitrate,
                    media.width,
                    media.height,
                    media.aspect_ratio,
                    media.audio_channels,
                    media.audio_codec,
                    media.video_codec,
                    media.video_resolution,
                    media.video_frame_rate,
                    media.container,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO images ({}, alt, image_type, url) VALUES (?1, ?2, ?3, ?4)",
                column
            ))?;
            for image in &relations.images {
                stmt.execute(params![key, image.alt, image.image_type, image.url])?;
            }
        }

        if let Some(ref colors) = relations.ultra_blur {
            tx.execute(
                &format!(
                    "INSERT INTO ultra_blur_colors ({}, top_left, top_right, bottom_left, bottom_right)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    column
                ),
                params![key, colors.top_left, colors.top_right, colors.bottom_left, colors.bottom_right],
            )?;
        }

        tx.commit()
            .with_context(|| format!("Failed to commit child relations for {}", key))?;
        Ok(())
    }

    /// Number of child rows of any kind attached to `parent`.
    pub fn child_row_count(&self, parent: &ParentRef) -> Result<i64> {
        let conn = self.conn()?;
        let mut total = 0;
        for table in CHILD_TABLES {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, parent.column()),
                [parent.rating_key()],
                |row| row.get(0),
            )?;
            total += count;
        }
        Ok(total)
    }

    /// Tag values of one tag-style child table (`genres`, `directors`, ...).
    pub fn child_tags(&self, parent: &ParentRef, table: &str) -> Result<Vec<String>> {
        let column_name = match table {
            "directors" | "genres" | "producers" | "writers" | "countries" | "roles" => "tag",
            "guids" => "guid",
            other => anyhow::bail!("{} is not a tag table", other),
        };
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY id",
            column_name,
            table,
            parent.column()
        ))?;
        let tags = stmt
            .query_map([parent.rating_key()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }
}

fn insert_tags(tx: &Transaction<'_>, table: &str, column: &str, key: &str, tags: &[String]) -> Result<()> {
    let mut stmt = tx.prepare(&format!("INSERT INTO {} ({}, tag) VALUES (?1, ?2)", table, column))?;
    for tag in tags {
        stmt.execute(params![key, tag])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextup_models::{ImageRef, MediaStream, RoleEntry, UltraBlurColors};

    fn relations() -> ChildRelations {
        ChildRelations {
            directors: vec!["Roland Emmerich".to_string()],
            genres: vec!["Science Fiction".to_string(), "Adventure".to_string()],
            producers: vec!["Dean Devlin".to_string()],
            writers: vec![],
            countries: vec!["United States of America".to_string()],
            roles: vec![RoleEntry {
                tag: "Kurt Russell".to_string(),
                role: Some("Col. Jonathan 'Jack' O'Neil".to_string()),
                thumb: None,
            }],
            ratings: vec![],
            guids: vec!["imdb://tt0111282".to_string(), "tmdb://2164".to_string()],
            media: vec![MediaStream {
                video_resolution: Some("1080".to_string()),
                ..MediaStream::default()
            }],
            images: vec![ImageRef {
                alt: Some("Stargate".to_string()),
                image_type: Some("coverPoster".to_string()),
                url: "/library/metadata/500/thumb/1".to_string(),
            }],
            ultra_blur: Some(UltraBlurColors {
                top_left: Some("2a1f1a".to_string()),
                ..UltraBlurColors::default()
            }),
        }
    }

    #[test]
    fn test_replace_children_replaces_not_appends() {
        let store = Store::open_in_memory().unwrap();
        let parent = ParentRef::Movie("500".to_string());
        let rel = relations();

        store.replace_children(&parent, &rel).unwrap();
        store.replace_children(&parent, &rel).unwrap();
        assert_eq!(store.child_row_count(&parent).unwrap(), rel.row_count() as i64);

        let mut smaller = rel.clone();
        smaller.genres.truncate(1);
        smaller.ultra_blur = None;
        store.replace_children(&parent, &smaller).unwrap();
        assert_eq!(store.child_row_count(&parent).unwrap(), smaller.row_count() as i64);
        assert_eq!(store.child_tags(&parent, "genres").unwrap(), vec!["Science Fiction"]);
    }

    #[test]
    fn test_replace_children_is_scoped_to_parent() {
        let store = Store::open_in_memory().unwrap();
        let movie = ParentRef::Movie("500".to_string());
        let show = ParentRef::Show("500".to_string());

        store.replace_children(&movie, &relations()).unwrap();
        store.replace_children(&show, &ChildRelations::default()).unwrap();

        assert_eq!(store.child_row_count(&movie).unwrap(), relations().row_count() as i64);
        assert_eq!(store.child_row_count(&show).unwrap(), 0);
        assert_eq!(
            store.child_tags(&movie, "guids").unwrap(),
            vec!["imdb://tt0111282", "tmdb://2164"]
        );
    }

    #[test]
    fn test_child_tags_rejects_unknown_table() {
        let store = Store::open_in_memory().unwrap();
        let parent = ParentRef::Episode("1".to_string());
        assert!(store.child_tags(&parent, "shows; DROP TABLE shows").is_err());
    }
}
