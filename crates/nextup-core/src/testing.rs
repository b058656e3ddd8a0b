//! In-memory stand-ins for the media server and TVDB.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use nextup_models::{Episode, Movie, SectionKind, Show};
use nextup_sources::plex::PlexTag;
use nextup_sources::{
    MediaServer, PlexDirectory, PlexMetadata, TvdbApi, TvdbEpisode, TvdbSearchResult, TvdbSeason,
    TvdbSeasonExtended, TvdbSeries,
};
use nextup_sources::tvdb::TvdbStatus;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn meta(rating_key: &str, title: &str) -> PlexMetadata {
    PlexMetadata {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        ..PlexMetadata::default()
    }
}

pub fn tags(names: &[&str]) -> Vec<PlexTag> {
    names
        .iter()
        .map(|n| PlexTag {
            tag: n.to_string(),
            title: None,
        })
        .collect()
}

pub fn section(key: &str, title: &str, section_type: &str) -> PlexDirectory {
    PlexDirectory {
        key: key.to_string(),
        title: title.to_string(),
        section_type: section_type.to_string(),
        ..PlexDirectory::default()
    }
}

fn date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

pub fn show_row(rating_key: &str, title: &str, collections: &[&str]) -> Show {
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

pub fn episode_row(rating_key: &str, show: &Show, season: i64, index: i64, aired: Option<&str>) -> Episode {
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
        originally_available_at: date(aired),
        view_count: 0,
        last_viewed_at: None,
        added_at: None,
        updated_at: None,
        thumb: None,
        art: None,
    }
}

pub fn movie_row(rating_key: &str, title: &str, released: Option<&str>, collections: &[&str]) -> Movie {
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
        originally_available_at: date(released),
        view_count: 0,
        last_viewed_at: None,
        added_at: None,
        updated_at: None,
        thumb: None,
        art: None,
        collections: collections.iter().map(|c| c.to_string()).collect(),
    }
}

#[derive(Default)]
pub struct FakeServer {
    pub sections: Vec<PlexDirectory>,
    pub section_items: HashMap<String, Vec<PlexMetadata>>,
    pub details: HashMap<String, PlexMetadata>,
    pub children: HashMap<String, Vec<PlexMetadata>>,
    pub failing_details: HashSet<String>,
    pub fail_sections: bool,
    pub detail_calls: AtomicUsize,
}

#[async_trait]
impl MediaServer for FakeServer {
    async fn get_sections(&self) -> Result<Vec<PlexDirectory>> {
        if self.fail_sections {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.sections.clone())
    }

    async fn get_section_items(&self, section_key: &str, _kind: SectionKind) -> Result<Vec<PlexMetadata>> {
        Ok(self.section_items.get(section_key).cloned().unwrap_or_default())
    }

    async fn get_metadata(&self, rating_key: &str) -> Result<Option<PlexMetadata>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(rating_key) {
            return Err(anyhow!("HTTP 500 for {}", rating_key));
        }
        Ok(self.details.get(rating_key).cloned())
    }

    async fn get_children(&self, rating_key: &str) -> Result<Vec<PlexMetadata>> {
        Ok(self.children.get(rating_key).cloned().unwrap_or_default())
    }
}

/// One known TVDB series keyed by name.
#[derive(Clone)]
pub struct FakeSeries {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub seasons: Vec<TvdbSeasonExtended>,
}

#[derive(Default)]
pub struct FakeTvdb {
    pub series: Vec<FakeSeries>,
    pub fail_search: bool,
    pub search_calls: AtomicUsize,
}

impl FakeTvdb {
    pub fn with_series(entries: &[(i64, &str, &str)]) -> Self {
        Self {
            series: entries
                .iter()
                .map(|(id, name, status)| FakeSeries {
                    id: *id,
                    name: name.to_string(),
                    status: status.to_string(),
                    seasons: Vec::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    fn find(&self, id: &str) -> Option<&FakeSeries> {
        self.series.iter().find(|s| s.id.to_string() == id)
    }
}

#[async_trait]
impl TvdbApi for FakeTvdb {
    async fn search(&self, query: &str, _kind: &str) -> Result<Vec<TvdbSearchResult>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(anyhow!("TVDB unreachable"));
        }
        let needle = query.to_lowercase();
        Ok(self
            .series
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle) || needle.contains(&s.name.to_lowercase()))
            .map(|s| TvdbSearchResult {
                tvdb_id: Some(s.id.to_string()),
                name: s.name.clone(),
                status: Some(s.status.clone()),
                ..TvdbSearchResult::default()
            })
            .collect())
    }

    async fn series_details(&self, series_id: &str) -> Result<Option<TvdbSeries>> {
        Ok(self.find(series_id).map(|s| TvdbSeries {
            id: s.id,
            name: s.name.clone(),
            status: Some(TvdbStatus {
                id: None,
                name: Some(s.status.clone()),
            }),
            ..TvdbSeries::default()
        }))
    }

    async fn series_seasons(&self, series_id: &str) -> Result<Vec<TvdbSeason>> {
        Ok(self
            .find(series_id)
            .map(|s| {
                s.seasons
                    .iter()
                    .map(|season| TvdbSeason {
                        id: season.id,
                        number: season.number,
                        season_type: None,
                        image: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn season_extended(&self, season_id: i64) -> Result<Option<TvdbSeasonExtended>> {
        Ok(self
            .series
            .iter()
            .flat_map(|s| s.seasons.iter())
            .find(|season| season.id == season_id)
            .cloned())
    }

    async fn episode_details(&self, episode_id: i64) -> Result<Option<TvdbEpisode>> {
        Ok(self
            .series
            .iter()
            .flat_map(|s| s.seasons.iter())
            .flat_map(|season| season.episodes.iter())
            .find(|e| e.id == episode_id)
            .cloned())
    }
}
