use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYNC_INTERVAL_HOURS: u32 = 12;
/// Longest accepted sync interval (one year).
pub const MAX_SYNC_INTERVAL_HOURS: u32 = 24 * 365;

/// The singleton settings row (id = 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub tv_weight: f64,
    pub movie_weight: f64,
    /// The active pick pool. Content in this collection is never surfaced by
    /// the "start something new" picker.
    pub selected_collection: Option<String>,
    pub ignored_tv_collections: Vec<String>,
    pub ignored_movie_collections: Vec<String>,
    pub sync_interval_hours: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tv_weight: 1.0,
            movie_weight: 1.0,
            selected_collection: None,
            ignored_tv_collections: Vec::new(),
            ignored_movie_collections: Vec::new(),
            sync_interval_hours: DEFAULT_SYNC_INTERVAL_HOURS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "movie" => Some(MediaKind::Movie),
            "episode" | "tv" => Some(MediaKind::Episode),
            _ => None,
        }
    }
}

/// An entry in a user-curated watch order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomOrderItem {
    pub id: i64,
    pub custom_order: String,
    pub media_kind: MediaKind,
    pub rating_key: String,
    pub title: String,
    pub added_at: DateTime<Utc>,
}
