//! TVDB lookups for series status and artwork. Every lookup is best effort:
//! failures are logged and read as "unknown".

use crate::matching::{best_match, rank, ScoredMatch};
use anyhow::Result;
use nextup_sources::{TvdbApi, TvdbSearchResult};
use std::sync::Arc;
use tracing::{debug, warn};

const MIN_SERIES_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub score: f64,
}

impl ResolvedSeries {
    pub fn is_ended(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("ended"))
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct SeriesResolver {
    tvdb: Arc<dyn TvdbApi>,
}

impl SeriesResolver {
    pub fn new(tvdb: Arc<dyn TvdbApi>) -> Self {
        Self { tvdb }
    }

    /// All series hits for `name`, best first.
    pub async fn scored_search(&self, name: &str) -> Result<Vec<ScoredMatch<TvdbSearchResult>>> {
        let results = self.tvdb.search(name, "series").await?;
        Ok(rank(name, results, |r| r.name.as_str()))
    }

    /// The best hit scoring at least 0.5, with its status from the series
    /// record when available.
    pub async fn find_series(&self, name: &str) -> Option<ResolvedSeries> {
        let results = match self.tvdb.search(name, "series").await {
            Ok(results) => results,
            Err(e) => {
                warn!(series = %name, error = %e, "TVDB search failed");
                return None;
            }
        };

        let best = best_match(name, results, |r| r.name.as_str(), MIN_SERIES_SCORE)?;
        let Some(id) = best.item.tvdb_id.clone() else {
            debug!("TVDB hit '{}' has no id", best.item.name);
            return None;
        };

        let status = match self.tvdb.series_details(&id).await {
            Ok(Some(series)) => series.status_name().map(str::to_string),
            Ok(None) => None,
            Err(e) => {
                warn!(series = %name, error = %e, "TVDB series lookup failed");
                None
            }
        }
        .or(best.item.status.clone());

        debug!(
            series = %name,
            tvdb_id = %id,
            score = best.score,
            status = ?status,
            "Resolved TVDB series"
        );
        Some(ResolvedSeries {
            id,
            name: best.item.name,
            status,
            score: best.score,
        })
    }

    pub async fn series_status(&self, name: &str) -> Option<String> {
        self.find_series(name).await.and_then(|s| s.status)
    }

    /// Poster for season `season_number` of the series.
    pub async fn season_artwork(&self, series_id: &str, season_number: i64) -> Option<String> {
        let seasons = match self.tvdb.series_seasons(series_id).await {
            Ok(seasons) => seasons,
            Err(e) => {
                warn!(tvdb_id = %series_id, error = %e, "TVDB seasons lookup failed");
                return None;
            }
        };
        let season = seasons
            .into_iter()
            .find(|s| s.is_official() && s.number == Some(season_number))?;

        match self.tvdb.season_extended(season.id).await {
            Ok(Some(extended)) => extended.poster().map(str::to_string).or(season.image),
            Ok(None) => season.image,
            Err(e) => {
                warn!(tvdb_id = %series_id, season = season_number, error = %e, "TVDB season lookup failed");
                season.image
            }
        }
    }

    /// Still image for one episode.
    pub async fn episode_artwork(&self, series_id: &str, season_number: i64, episode_number: i64) -> Option<String> {
        let seasons = self.tvdb.series_seasons(series_id).await.ok()?;
        let season = seasons
            .into_iter()
            .find(|s| s.is_official() && s.number == Some(season_number))?;
        let extended = self.tvdb.season_extended(season.id).await.ok()??;
        let episode = extended
            .episodes
            .into_iter()
            .find(|e| e.number == Some(episode_number))?;

        if let Some(image) = episode.image.filter(|i| !i.is_empty()) {
            return Some(image);
        }
        match self.tvdb.episode_details(episode.id).await {
            Ok(details) => details.and_then(|d| d.image).filter(|i| !i.is_empty()),
            Err(e) => {
                warn!(tvdb_id = %series_id, error = %e, "TVDB episode lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSeries, FakeTvdb};
    use nextup_sources::{TvdbEpisode, TvdbSeasonExtended};

    fn resolver(tvdb: FakeTvdb) -> SeriesResolver {
        SeriesResolver::new(Arc::new(tvdb))
    }

    #[tokio::test]
    async fn test_find_series_prefers_exact_title() {
        let tvdb = FakeTvdb::with_series(&[
            (1, "Doctor Who (2005)", "Ended"),
            (2, "Doctor Who", "Ended"),
            (3, "Doctor Who Confidential", "Ended"),
        ]);
        let found = resolver(tvdb).find_series("Doctor Who").await.unwrap();
        assert_eq!(found.id, "2");
        assert!(found.is_ended());
    }

    #[tokio::test]
    async fn test_find_series_below_threshold_is_none() {
        let tvdb = FakeTvdb::with_series(&[(1, "Sherlock", "Ended")]);
        assert!(resolver(tvdb).find_series("Doctor Who").await.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_is_unknown_status() {
        let tvdb = FakeTvdb {
            fail_search: true,
            ..FakeTvdb::with_series(&[(1, "Firefly", "Ended")])
        };
        assert!(resolver(tvdb).series_status("Firefly").await.is_none());
    }

    #[tokio::test]
    async fn test_artwork_lookup() {
        let mut series = FakeSeries {
            id: 72449,
            name: "Stargate SG-1".to_string(),
            status: "Ended".to_string(),
            seasons: Vec::new(),
        };
        series.seasons.push(TvdbSeasonExtended {
            id: 9001,
            number: Some(1),
            image: Some("season-1.jpg".to_string()),
            episodes: vec![
                TvdbEpisode {
                    id: 1,
                    number: Some(1),
                    image: Some("s01e01.jpg".to_string()),
                    ..TvdbEpisode::default()
                },
                TvdbEpisode {
                    id: 2,
                    number: Some(2),
                    image: None,
                    ..TvdbEpisode::default()
                },
            ],
            artwork: Vec::new(),
        });
        let tvdb = FakeTvdb {
            series: vec![series],
            ..FakeTvdb::default()
        };
        let resolver = resolver(tvdb);

        assert_eq!(resolver.season_artwork("72449", 1).await.as_deref(), Some("season-1.jpg"));
        assert!(resolver.season_artwork("72449", 7).await.is_none());
        assert_eq!(resolver.episode_artwork("72449", 1, 1).await.as_deref(), Some("s01e01.jpg"));
        assert!(resolver.episode_artwork("72449", 1, 2).await.is_none());
    }
}
