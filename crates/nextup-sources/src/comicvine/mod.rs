mod client;

pub use client::{ComicVineClient, ComicVolume, ComicVolumeImage, ComicVolumePublisher, COMICVINE_BASE_URL};
