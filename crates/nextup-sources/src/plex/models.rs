use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaContainer {
    #[serde(rename = "machineIdentifier")]
    pub machine_identifier: Option<String>,
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
    #[serde(rename = "Directory", default)]
    pub directory: Vec<PlexDirectory>,
}

/// A library section as listed by `/library/sections`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlexDirectory {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub section_type: String,
    pub agent: Option<String>,
    pub scanner: Option<String>,
    pub language: Option<String>,
    pub uuid: Option<String>,
    #[serde(default)]
    pub refreshing: bool,
    pub updated_at: Option<i64>,
    pub scanned_at: Option<i64>,
}

/// One metadata item (movie, show, season or episode). Bulk listings fill
/// only the flat fields; the per-item endpoint adds the tag arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadata {
    pub rating_key: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub guid: Option<String>,
    #[serde(default)]
    pub title: String,
    pub year: Option<i32>,
    pub tagline: Option<String>,
    pub summary: Option<String>,
    pub studio: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<f64>,
    pub audience_rating: Option<f64>,
    pub duration: Option<i64>,
    pub originally_available_at: Option<String>,
    pub view_count: Option<i64>,
    pub last_viewed_at: Option<i64>,
    pub added_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub thumb: Option<String>,
    pub art: Option<String>,
    pub index: Option<i64>,
    pub parent_index: Option<i64>,
    pub parent_rating_key: Option<String>,
    pub grandparent_rating_key: Option<String>,
    pub grandparent_title: Option<String>,
    pub child_count: Option<i64>,
    pub leaf_count: Option<i64>,
    pub viewed_leaf_count: Option<i64>,
    #[serde(rename = "Collection", default)]
    pub collections: Vec<PlexTag>,
    #[serde(rename = "Director", default)]
    pub directors: Vec<PlexTag>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<PlexTag>,
    #[serde(rename = "Producer", default)]
    pub producers: Vec<PlexTag>,
    #[serde(rename = "Writer", default)]
    pub writers: Vec<PlexTag>,
    #[serde(rename = "Country", default)]
    pub countries: Vec<PlexTag>,
    #[serde(rename = "Role", default)]
    pub roles: Vec<PlexRole>,
    #[serde(rename = "Rating", default)]
    pub ratings: Vec<PlexRating>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PlexGuid>,
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
    #[serde(rename = "Image", default)]
    pub images: Vec<PlexImage>,
    #[serde(rename = "UltraBlurColors")]
    pub ultra_blur_colors: Option<PlexUltraBlurColors>,
}

/// `{ "tag": "..." }`. Collections sometimes carry `title` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlexTag {
    #[serde(default)]
    pub tag: String,
    pub title: Option<String>,
}

impl PlexTag {
    pub fn name(&self) -> Option<&str> {
        let tag = self.tag.trim();
        if !tag.is_empty() {
            return Some(tag);
        }
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlexRole {
    #[serde(default)]
    pub tag: String,
    pub role: Option<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlexRating {
    pub image: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "type")]
    pub rating_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlexGuid {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlexMedia {
    pub id: Option<i64>,
    pub duration: Option<i64>,
    pub bitrate: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub aspect_ratio: Option<f64>,
    pub audio_channels: Option<i64>,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub video_resolution: Option<String>,
    pub video_frame_rate: Option<String>,
    pub container: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlexImage {
    pub alt: Option<String>,
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlexUltraBlurColors {
    pub top_left: Option<String>,
    pub top_right: Option<String>,
    pub bottom_left: Option<String>,
    pub bottom_right: Option<String>,
}
