mod client;
mod models;

pub use client::{TvdbClient, TVDB_BASE_URL};
pub use models::{
    TvdbArtwork, TvdbEpisode, TvdbSearchResult, TvdbSeason, TvdbSeasonExtended, TvdbSeasonType, TvdbSeries,
    TvdbStatus,
};
