use serde::{Deserialize, Serialize};

/// The owner of a set of child relation rows. Each child table carries one
/// nullable foreign key column per parent kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Movie(String),
    Show(String),
    Season(String),
    Episode(String),
}

impl ParentRef {
    pub fn column(&self) -> &'static str {
        match self {
            ParentRef::Movie(_) => "movie_key",
            ParentRef::Show(_) => "show_key",
            ParentRef::Season(_) => "season_key",
            ParentRef::Episode(_) => "episode_key",
        }
    }

    pub fn rating_key(&self) -> &str {
        match self {
            ParentRef::Movie(key)
            | ParentRef::Show(key)
            | ParentRef::Season(key)
            | ParentRef::Episode(key) => key,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleEntry {
    pub tag: String,
    pub role: Option<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingEntry {
    pub image: Option<String>,
    pub value: Option<f64>,
    pub rating_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaStream {
    pub media_id: Option<i64>,
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
pub struct ImageRef {
    pub alt: Option<String>,
    pub image_type: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UltraBlurColors {
    pub top_left: Option<String>,
    pub top_right: Option<String>,
    pub bottom_left: Option<String>,
    pub bottom_right: Option<String>,
}

/// All child rows mapped from one detailed metadata response. Which lists are
/// populated depends on the entity kind (producers and countries only exist on
/// movies, for instance).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChildRelations {
    pub directors: Vec<String>,
    pub genres: Vec<String>,
    pub producers: Vec<String>,
    pub writers: Vec<String>,
    pub countries: Vec<String>,
    pub roles: Vec<RoleEntry>,
    pub ratings: Vec<RatingEntry>,
    pub guids: Vec<String>,
    pub media: Vec<MediaStream>,
    pub images: Vec<ImageRef>,
    pub ultra_blur: Option<UltraBlurColors>,
}

impl ChildRelations {
    pub fn row_count(&self) -> usize {
        self.directors.len()
            + self.genres.len()
            + self.producers.len()
            + self.writers.len()
            + self.countries.len()
            + self.roles.len()
            + self.ratings.len()
            + self.guids.len()
            + self.media.len()
            + self.images.len()
            + usize::from(self.ultra_blur.is_some())
    }
}
