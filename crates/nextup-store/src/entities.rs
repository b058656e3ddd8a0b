use crate::store::{upsert_sql, Store};
use anyhow::{Context, Result};
use nextup_models::{normalize_collection_name, Episode, LibrarySection, Movie, Season, SectionKind, Show};
use rusqlite::{params, OptionalExtension, Row, Transaction};

const SECTION_COLUMNS: &[&str] = &[
    "section_key", "title", "kind", "agent", "scanner", "language", "uuid", "refreshing", "updated_at",
    "scanned_at",
];

const SHOW_COLUMNS: &[&str] = &[
    "rating_key", "section_key", "guid", "title", "year", "summary", "studio", "content_rating", "rating",
    "audience_rating", "originally_available_at", "child_count", "leaf_count", "viewed_leaf_count",
    "added_at", "updated_at", "thumb", "art",
];

const SEASON_COLUMNS: &[&str] = &[
    "rating_key", "show_rating_key", "title", "season_index", "summary", "leaf_count", "viewed_leaf_count",
    "added_at", "updated_at", "thumb", "art",
];

pub(crate) const EPISODE_COLUMNS: &[&str] = &[
    "rating_key", "season_rating_key", "show_rating_key", "show_title", "season_index", "episode_index",
    "title", "summary", "content_rating", "duration", "originally_available_at", "view_count",
    "last_viewed_at", "added_at", "updated_at", "thumb", "art",
];

pub(crate) const MOVIE_COLUMNS: &[&str] = &[
    "rating_key", "section_key", "guid", "title", "year", "tagline", "summary", "studio", "content_rating",
    "rating", "audience_rating", "duration", "originally_available_at", "view_count", "last_viewed_at",
    "added_at", "updated_at", "thumb", "art",
];

impl Store {
    pub fn upsert_section(&self, section: &LibrarySection) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &upsert_sql("library_sections", SECTION_COLUMNS),
            params![
                section.section_key,
                section.title,
                section.kind.as_str(),
                section.agent,
                section.scanner,
                section.language,
                section.uuid,
                section.refreshing,
                section.updated_at,
                section.scanned_at,
            ],
        )
        .with_context(|| format!("Failed to upsert section {}", section.section_key))?;
        Ok(())
    }

    pub fn list_sections(&self) -> Result<Vec<LibrarySection>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM library_sections ORDER BY section_key",
            SECTION_COLUMNS.join(", ")
        ))?;
        let sections = stmt
            .query_map([], |row| {
                let kind: String = row.get(2)?;
                Ok(LibrarySection {
                    section_key: row.get(0)?,
                    title: row.get(1)?,
                    kind: SectionKind::from_plex_type(&kind).unwrap_or(SectionKind::Movie),
                    agent: row.get(3)?,
                    scanner: row.get(4)?,
                    language: row.get(5)?,
                    uuid: row.get(6)?,
                    refreshing: row.get(7)?,
                    updated_at: row.get(8)?,
                    scanned_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    /// Upsert the flat show row and its collection memberships.
    pub fn upsert_show(&self, show: &Show) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &upsert_sql("shows", SHOW_COLUMNS),
            params![
                show.rating_key,
                show.section_key,
                show.guid,
                show.title,
                show.year,
                show.summary,
                show.studio,
                show.content_rating,
                show.rating,
                show.audience_rating,
                show.originally_available_at,
                show.child_count,
                show.leaf_count,
                show.viewed_leaf_count,
                show.added_at,
                show.updated_at,
                show.thumb,
                show.art,
            ],
        )
        .with_context(|| format!("Failed to upsert show {}", show.rating_key))?;
        replace_memberships(&tx, SectionKind::Show, &show.rating_key, &show.collections)?;
        tx.commit()?;
        Ok(())
    }

    pub fn upsert_season(&self, season: &Season) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &upsert_sql("seasons", SEASON_COLUMNS),
            params![
                season.rating_key,
                season.show_rating_key,
                season.title,
                season.index,
                season.summary,
                season.leaf_count,
                season.viewed_leaf_count,
                season.added_at,
                season.updated_at,
                season.thumb,
                season.art,
            ],
        )
        .with_context(|| format!("Failed to upsert season {}", season.rating_key))?;
        Ok(())
    }

    pub fn upsert_episode(&self, episode: &Episode) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &upsert_sql("episodes", EPISODE_COLUMNS),
            params![
                episode.rating_key,
                episode.season_rating_key,
                episode.show_rating_key,
                episode.show_title,
                episode.season_index,
                episode.episode_index,
                episode.title,
                episode.summary,
                episode.content_rating,
                episode.duration,
                episode.originally_available_at,
                episode.view_count,
                episode.last_viewed_at,
                episode.added_at,
                episode.updated_at,
                episode.thumb,
                episode.art,
            ],
        )
        .with_context(|| format!("Failed to upsert episode {}", episode.rating_key))?;
        Ok(())
    }

    /// Upsert the flat movie row and its collection memberships.
    pub fn upsert_movie(&self, movie: &Movie) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &upsert_sql("movies", MOVIE_COLUMNS),
            params![
                movie.rating_key,
                movie.section_key,
                movie.guid,
                movie.title,
                movie.year,
                movie.tagline,
                movie.summary,
                movie.studio,
                movie.content_rating,
                movie.rating,
                movie.audience_rating,
                movie.duration,
                movie.originally_available_at,
                movie.view_count,
                movie.last_viewed_at,
                movie.added_at,
                movie.updated_at,
                movie.thumb,
                movie.art,
            ],
        )
        .with_context(|| format!("Failed to upsert movie {}", movie.rating_key))?;
        replace_memberships(&tx, SectionKind::Movie, &movie.rating_key, &movie.collections)?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_show(&self, rating_key: &str) -> Result<Option<Show>> {
        let show = {
            let conn = self.conn()?;
            conn.query_row(
                &format!("SELECT {} FROM shows WHERE rating_key = ?1", SHOW_COLUMNS.join(", ")),
                [rating_key],
                show_from_row,
            )
            .optional()?
        };
        match show {
            Some(mut show) => {
                show.collections = self.collections_of(SectionKind::Show, rating_key)?;
                Ok(Some(show))
            }
            None => Ok(None),
        }
    }

    pub fn get_season(&self, rating_key: &str) -> Result<Option<Season>> {
        let conn = self.conn()?;
        let season = conn
            .query_row(
                &format!("SELECT {} FROM seasons WHERE rating_key = ?1", SEASON_COLUMNS.join(", ")),
                [rating_key],
                |row| {
                    Ok(Season {
                        rating_key: row.get(0)?,
                        show_rating_key: row.get(1)?,
                        title: row.get(2)?,
                        index: row.get(3)?,
                        summary: row.get(4)?,
                        leaf_count: row.get(5)?,
                        viewed_leaf_count: row.get(6)?,
                        added_at: row.get(7)?,
                        updated_at: row.get(8)?,
                        thumb: row.get(9)?,
                        art: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(season)
    }

    pub fn get_episode(&self, rating_key: &str) -> Result<Option<Episode>> {
        let conn = self.conn()?;
        let episode = conn
            .query_row(
                &format!("SELECT {} FROM episodes WHERE rating_key = ?1", EPISODE_COLUMNS.join(", ")),
                [rating_key],
                episode_from_row,
            )
            .optional()?;
        Ok(episode)
    }

    pub fn get_movie(&self, rating_key: &str) -> Result<Option<Movie>> {
        let movie = {
            let conn = self.conn()?;
            conn.query_row(
                &format!("SELECT {} FROM movies WHERE rating_key = ?1", MOVIE_COLUMNS.join(", ")),
                [rating_key],
                movie_from_row,
            )
            .optional()?
        };
        match movie {
            Some(mut movie) => {
                movie.collections = self.collections_of(SectionKind::Movie, rating_key)?;
                Ok(Some(movie))
            }
            None => Ok(None),
        }
    }

    /// Collection names of a show or movie in upstream order.
    pub fn collections_of(&self, kind: SectionKind, rating_key: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM collection_memberships
             WHERE media_kind = ?1 AND rating_key = ?2
             ORDER BY position ASC",
        )?;
        let names = stmt
            .query_map(params![kind.as_str(), rating_key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

fn replace_memberships(tx: &Transaction<'_>, kind: SectionKind, rating_key: &str, names: &[String]) -> Result<()> {
    tx.execute(
        "DELETE FROM collection_memberships WHERE media_kind = ?1 AND rating_key = ?2",
        params![kind.as_str(), rating_key],
    )?;
    let mut stmt = tx.prepare(
        "INSERT INTO collection_memberships (media_kind, rating_key, position, name, normalized_name)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (position, name) in names.iter().enumerate() {
        stmt.execute(params![
            kind.as_str(),
            rating_key,
            position as i64,
            name,
            normalize_collection_name(name),
        ])?;
    }
    Ok(())
}

fn show_from_row(row: &Row<'_>) -> rusqlite::Result<Show> {
    Ok(Show {
        rating_key: row.get(0)?,
        section_key: row.get(1)?,
        guid: row.get(2)?,
        title: row.get(3)?,
        year: row.get(4)?,
        summary: row.get(5)?,
        studio: row.get(6)?,
        content_rating: row.get(7)?,
        rating: row.get(8)?,
        audience_rating: row.get(9)?,
        originally_available_at: row.get(10)?,
        child_count: row.get(11)?,
        leaf_count: row.get(12)?,
        viewed_leaf_count: row.get(13)?,
        added_at: row.get(14)?,
        updated_at: row.get(15)?,
        thumb: row.get(16)?,
        art: row.get(17)?,
        collections: Vec::new(),
    })
}

pub(crate) fn episode_from_row(row: &Row<'_>) -> rusqlite::Result<Episode> {
    Ok(Episode {
        rating_key: row.get(0)?,
        season_rating_key: row.get(1)?,
        show_rating_key: row.get(2)?,
        show_title: row.get(3)?,
        season_index: row.get(4)?,
        episode_index: row.get(5)?,
        title: row.get(6)?,
        summary: row.get(7)?,
        content_rating: row.get(8)?,
        duration: row.get(9)?,
        originally_available_at: row.get(10)?,
        view_count: row.get(11)?,
        last_viewed_at: row.get(12)?,
        added_at: row.get(13)?,
        updated_at: row.get(14)?,
        thumb: row.get(15)?,
        art: row.get(16)?,
    })
}

/// Collections are left empty; callers fill them with `collections_of`.
pub(crate) fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        rating_key: row.get(0)?,
        section_key: row.get(1)?,
        guid: row.get(2)?,
        title: row.get(3)?,
        year: row.get(4)?,
        tagline: row.get(5)?,
        summary: row.get(6)?,
        studio: row.get(7)?,
        content_rating: row.get(8)?,
        rating: row.get(9)?,
        audience_rating: row.get(10)?,
        duration: row.get(11)?,
        originally_available_at: row.get(12)?,
        view_count: row.get(13)?,
        last_viewed_at: row.get(14)?,
        added_at: row.get(15)?,
        updated_at: row.get(16)?,
        thumb: row.get(17)?,
        art: row.get(18)?,
        collections: Vec::new(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use nextup_models::{Episode, Movie, Show};

    pub fn show(rating_key: &str, title: &str, collections: &[&str]) -> Show {
        Show {
            rating_key: rating_key.to_string(),
            section_key: Some("2".to_string()),
            guid: None,
            title: title.to_string(),
            year: None,
            summary: None,
            studio: None,
            content_rating: None,
            rating: None,
            audience_rating: None,
            originally_available_at: None,
            child_count: None,
            leaf_count: None,
            viewed_leaf_count: None,
            added_at: None,
            updated_at: None,
            thumb: None,
            art: None,
            collections: collections.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn episode(rating_key: &str, show: &Show, season: i64, index: i64, aired: Option<&str>) -> Episode {
        Episode {
            rating_key: rating_key.to_string(),
            season_rating_key: format!("{}-s{}", show.rating_key, season),
            show_rating_key: show.rating_key.clone(),
            show_title: show.title.clone(),
            season_index: season,
            episode_index: index,
            title: format!("Episode {}", index),
            summary: None,
            content_rating: None,
            duration: None,
            originally_available_at: aired.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            view_count: 0,
            last_viewed_at: None,
            added_at: None,
            updated_at: None,
            thumb: None,
            art: None,
        }
    }

    pub fn movie(rating_key: &str, title: &str, released: Option<&str>, collections: &[&str]) -> Movie {
        Movie {
            rating_key: rating_key.to_string(),
            section_key: Some("1".to_string()),
            guid: None,
            title: title.to_string(),
            year: None,
            tagline: None,
            summary: None,
            studio: None,
            content_rating: None,
            rating: None,
            audience_rating: None,
            duration: None,
            originally_available_at: released.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            view_count: 0,
            last_viewed_at: None,
            added_at: None,
            updated_at: None,
            thumb: None,
            art: None,
            collections: collections.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_upsert_show_is_keyed_by_rating_key() {
        let store = Store::open_in_memory().unwrap();
        let mut s = show("100", "Stargate SG-1", &["Stargate Collection"]);
        store.upsert_show(&s).unwrap();

        s.title = "Stargate SG-1 (1997)".to_string();
        s.collections = vec!["Stargate".to_string(), "Sci-Fi".to_string()];
        store.upsert_show(&s).unwrap();

        let counts = store.table_counts().unwrap();
        assert_eq!(counts["shows"], 1);
        assert_eq!(counts["collection_memberships"], 2);

        let loaded = store.get_show("100").unwrap().unwrap();
        assert_eq!(loaded.title, "Stargate SG-1 (1997)");
        assert_eq!(loaded.collections, vec!["Stargate", "Sci-Fi"]);
    }

    #[test]
    fn test_upsert_episode_round_trips_dates() {
        let store = Store::open_in_memory().unwrap();
        let s = show("100", "The X-Files", &[]);
        let e = episode("101", &s, 1, 1, Some("1993-09-10"));
        store.upsert_episode(&e).unwrap();
        store.upsert_episode(&e).unwrap();

        let loaded = store.get_episode("101").unwrap().unwrap();
        assert_eq!(loaded, e);
        assert_eq!(store.table_counts().unwrap()["episodes"], 1);
    }

    #[test]
    fn test_upsert_movie_and_section() {
        let store = Store::open_in_memory().unwrap();
        let m = movie("500", "Stargate", Some("1994-10-28"), &["Stargate"]);
        store.upsert_movie(&m).unwrap();
        assert_eq!(store.get_movie("500").unwrap().unwrap(), m);

        let section = LibrarySection {
            section_key: "1".to_string(),
            title: "Movies".to_string(),
            kind: SectionKind::Movie,
            agent: Some("tv.plex.agents.movie".to_string()),
            scanner: None,
            language: Some("en-US".to_string()),
            uuid: None,
            refreshing: false,
            updated_at: None,
            scanned_at: None,
        };
        store.upsert_section(&section).unwrap();
        store.upsert_section(&section).unwrap();
        assert_eq!(store.list_sections().unwrap(), vec![section]);
    }

    #[test]
    fn test_missing_rows_are_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_show("nope").unwrap().is_none());
        assert!(store.get_movie("nope").unwrap().is_none());
        assert!(store.get_season("nope").unwrap().is_none());
    }
}
