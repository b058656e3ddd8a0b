pub mod comicvine;
pub mod error;
pub mod plex;
pub mod traits;
pub mod tvdb;

pub use comicvine::{ComicVineClient, ComicVolume};
pub use error::SourceError;
pub use plex::{PlexDirectory, PlexHttpClient, PlexMetadata};
pub use traits::{MediaServer, TvdbApi};
pub use tvdb::{TvdbClient, TvdbEpisode, TvdbSearchResult, TvdbSeason, TvdbSeasonExtended, TvdbSeries};
