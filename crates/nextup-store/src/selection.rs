//! Read-only queries used by the selection engine.

use crate::entities::{episode_from_row, movie_from_row, EPISODE_COLUMNS, MOVIE_COLUMNS};
use crate::store::{placeholders, Store};
use anyhow::Result;
use nextup_models::{Episode, Movie, SectionKind};
use rusqlite::{params_from_iter, OptionalExtension};

impl Store {
    pub fn count_unplayed_episodes(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM episodes WHERE view_count = 0", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// The unplayed episode at `offset` in a stable (rating key) order.
    pub fn unplayed_episode_at(&self, offset: i64) -> Result<Option<Episode>> {
        let conn = self.conn()?;
        let episode = conn
            .query_row(
                &format!(
                    "SELECT {} FROM episodes WHERE view_count = 0 ORDER BY rating_key LIMIT 1 OFFSET ?1",
                    EPISODE_COLUMNS.join(", ")
                ),
                [offset],
                episode_from_row,
            )
            .optional()?;
        Ok(episode)
    }

    pub fn show_collections(&self, show_rating_key: &str) -> Result<Vec<String>> {
        self.collections_of(SectionKind::Show, show_rating_key)
    }

    /// Show rating keys that belong to any of the given normalized collection
    /// names.
    pub fn shows_in_collections(&self, normalized_names: &[String]) -> Result<Vec<String>> {
        if normalized_names.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT rating_key FROM collection_memberships
             WHERE media_kind = 'show' AND normalized_name IN ({})
             ORDER BY rating_key",
            placeholders(normalized_names.len(), 0)
        ))?;
        let keys = stmt
            .query_map(params_from_iter(normalized_names.iter()), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// `(movie rating key, normalized collection name)` for every collection
    /// membership of an unplayed movie.
    pub fn movie_collection_index(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT m.rating_key, c.normalized_name
             FROM collection_memberships c
             JOIN movies m ON m.rating_key = c.rating_key
             WHERE c.media_kind = 'movie' AND m.view_count = 0
             ORDER BY m.rating_key, c.position",
        )?;
        let index = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;
        Ok(index)
    }

    /// Earliest dated unplayed episode across the given shows. Ties on the
    /// air date fall back to season then episode index.
    pub fn earliest_unplayed_episode(&self, show_rating_keys: &[String]) -> Result<Option<Episode>> {
        if show_rating_keys.is_empty() {
            return Ok(None);
        }
        let conn = self.conn()?;
        let episode = conn
            .query_row(
                &format!(
                    "SELECT {} FROM episodes
                     WHERE view_count = 0
                       AND originally_available_at IS NOT NULL
                       AND show_rating_key IN ({})
                     ORDER BY originally_available_at ASC, season_index ASC, episode_index ASC
                     LIMIT 1",
                    EPISODE_COLUMNS.join(", "),
                    placeholders(show_rating_keys.len(), 0)
                ),
                params_from_iter(show_rating_keys.iter()),
                episode_from_row,
            )
            .optional()?;
        Ok(episode)
    }

    /// Earliest dated unplayed movie among the given rating keys.
    pub fn earliest_unplayed_movie(&self, movie_rating_keys: &[String]) -> Result<Option<Movie>> {
        if movie_rating_keys.is_empty() {
            return Ok(None);
        }
        let movie = {
            let conn = self.conn()?;
            conn.query_row(
                &format!(
                    "SELECT {} FROM movies
                     WHERE view_count = 0
                       AND originally_available_at IS NOT NULL
                       AND rating_key IN ({})
                     ORDER BY originally_available_at ASC, rating_key ASC
                     LIMIT 1",
                    MOVIE_COLUMNS.join(", "),
                    placeholders(movie_rating_keys.len(), 0)
                ),
                params_from_iter(movie_rating_keys.iter()),
                movie_from_row,
            )
            .optional()?
        };
        self.with_movie_collections(movie)
    }

    /// First unplayed episode of a show by season and episode index, dated or
    /// not.
    pub fn first_unplayed_episode_of_show(&self, show_rating_key: &str) -> Result<Option<Episode>> {
        let conn = self.conn()?;
        let episode = conn
            .query_row(
                &format!(
                    "SELECT {} FROM episodes
                     WHERE view_count = 0 AND show_rating_key = ?1
                     ORDER BY season_index ASC, episode_index ASC
                     LIMIT 1",
                    EPISODE_COLUMNS.join(", ")
                ),
                [show_rating_key],
                episode_from_row,
            )
            .optional()?;
        Ok(episode)
    }

    pub fn count_unplayed_movies(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM movies WHERE view_count = 0", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    pub fn unplayed_movie_at(&self, offset: i64) -> Result<Option<Movie>> {
        let movie = {
            let conn = self.conn()?;
            conn.query_row(
                &format!(
                    "SELECT {} FROM movies WHERE view_count = 0 ORDER BY rating_key LIMIT 1 OFFSET ?1",
                    MOVIE_COLUMNS.join(", ")
                ),
                [offset],
                movie_from_row,
            )
            .optional()?
        };
        self.with_movie_collections(movie)
    }

    fn with_movie_collections(&self, movie: Option<Movie>) -> Result<Option<Movie>> {
        match movie {
            Some(mut movie) => {
                movie.collections = self.collections_of(SectionKind::Movie, &movie.rating_key)?;
                Ok(Some(movie))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{episode, movie, show};

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_unplayed_episode_offsets_skip_watched() {
        let store = Store::open_in_memory().unwrap();
        let s = show("10", "Farscape", &[]);
        let mut watched = episode("11", &s, 1, 1, Some("1999-03-19"));
        watched.view_count = 2;
        store.upsert_episode(&watched).unwrap();
        store.upsert_episode(&episode("12", &s, 1, 2, Some("1999-03-26"))).unwrap();
        store.upsert_episode(&episode("13", &s, 1, 3, None)).unwrap();

        assert_eq!(store.count_unplayed_episodes().unwrap(), 2);
        assert_eq!(store.unplayed_episode_at(0).unwrap().unwrap().rating_key, "12");
        assert_eq!(store.unplayed_episode_at(1).unwrap().unwrap().rating_key, "13");
        assert!(store.unplayed_episode_at(2).unwrap().is_none());
    }

    #[test]
    fn test_shows_in_collections_uses_normalized_names() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_show(&show("1", "Stargate SG-1", &["Stargate Collection"])).unwrap();
        store.upsert_show(&show("2", "Stargate Atlantis", &["Stargate"])).unwrap();
        store.upsert_show(&show("3", "Star Trek", &["Star Trek"])).unwrap();

        let found = store.shows_in_collections(&keys(&["stargate"])).unwrap();
        assert_eq!(found, keys(&["1", "2"]));
        assert!(store.shows_in_collections(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_earliest_unplayed_episode_excludes_undated() {
        let store = Store::open_in_memory().unwrap();
        let s = show("10", "The X-Files", &[]);
        store.upsert_episode(&episode("11", &s, 0, 1, None)).unwrap();
        store.upsert_episode(&episode("12", &s, 1, 2, Some("1993-09-17"))).unwrap();
        store.upsert_episode(&episode("13", &s, 1, 1, Some("1993-09-17"))).unwrap();

        let earliest = store.earliest_unplayed_episode(&keys(&["10"])).unwrap().unwrap();
        assert_eq!(earliest.rating_key, "13");
        assert!(store.earliest_unplayed_episode(&keys(&["99"])).unwrap().is_none());
    }

    #[test]
    fn test_first_unplayed_episode_of_show_ignores_dates() {
        let store = Store::open_in_memory().unwrap();
        let s = show("10", "Firefly", &[]);
        store.upsert_episode(&episode("12", &s, 1, 2, Some("2002-09-20"))).unwrap();
        store.upsert_episode(&episode("11", &s, 1, 1, None)).unwrap();

        let first = store.first_unplayed_episode_of_show("10").unwrap().unwrap();
        assert_eq!(first.rating_key, "11");
    }

    #[test]
    fn test_movie_queries() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_movie(&movie("500", "Stargate", Some("1994-10-28"), &["Stargate Collection"]))
            .unwrap();
        store
            .upsert_movie(&movie("501", "Stargate: Continuum", Some("2008-07-29"), &["Stargate"]))
            .unwrap();
        let mut watched = movie("502", "Stargate: The Ark of Truth", Some("2008-03-11"), &["Stargate"]);
        watched.view_count = 1;
        store.upsert_movie(&watched).unwrap();

        assert_eq!(store.count_unplayed_movies().unwrap(), 2);
        assert_eq!(
            store.movie_collection_index().unwrap(),
            vec![
                ("500".to_string(), "stargate".to_string()),
                ("501".to_string(), "stargate".to_string()),
            ]
        );

        let earliest = store.earliest_unplayed_movie(&keys(&["501", "500", "502"])).unwrap().unwrap();
        assert_eq!(earliest.rating_key, "500");
        assert_eq!(earliest.collections, vec!["Stargate Collection"]);

        let second = store.unplayed_movie_at(1).unwrap().unwrap();
        assert_eq!(second.rating_key, "501");
    }
}
