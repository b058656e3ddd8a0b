use crate::plex::{PlexDirectory, PlexMetadata};
use crate::tvdb::{TvdbEpisode, TvdbSearchResult, TvdbSeason, TvdbSeasonExtended, TvdbSeries};
use anyhow::Result;
use async_trait::async_trait;
use nextup_models::SectionKind;

/// The media server endpoints the sync pipeline walks.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// `GET /library/sections`
    async fn get_sections(&self) -> Result<Vec<PlexDirectory>>;

    /// `GET /library/sections/{key}/all?type={1|2}`. Bulk items lack
    /// collections, cast and most child tags.
    async fn get_section_items(&self, section_key: &str, kind: SectionKind) -> Result<Vec<PlexMetadata>>;

    /// `GET /library/metadata/{ratingKey}`, the fully detailed item.
    async fn get_metadata(&self, rating_key: &str) -> Result<Option<PlexMetadata>>;

    /// `GET /library/metadata/{ratingKey}/children`
    async fn get_children(&self, rating_key: &str) -> Result<Vec<PlexMetadata>>;
}

/// TVDB v4 lookups. Not-found and persistent auth failures come back as
/// `None` or an empty list; only transport and parse failures are errors.
#[async_trait]
pub trait TvdbApi: Send + Sync {
    async fn search(&self, query: &str, kind: &str) -> Result<Vec<TvdbSearchResult>>;
    async fn series_details(&self, series_id: &str) -> Result<Option<TvdbSeries>>;
    async fn series_seasons(&self, series_id: &str) -> Result<Vec<TvdbSeason>>;
    async fn season_extended(&self, season_id: i64) -> Result<Option<TvdbSeasonExtended>>;
    async fn episode_details(&self, episode_id: i64) -> Result<Option<TvdbEpisode>>;
}
