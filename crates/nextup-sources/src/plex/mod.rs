mod api;
pub mod convert;
mod models;

pub use api::PlexHttpClient;
pub use models::{
    PlexDirectory, PlexGuid, PlexImage, PlexMedia, PlexMetadata, PlexRating, PlexRole, PlexTag, PlexUltraBlurColors,
};
