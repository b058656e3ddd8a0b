use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Movie,
    Show,
}

impl SectionKind {
    /// Parse the upstream `type` field. Other library types (music, photo)
    /// are not synced and map to `None`.
    pub fn from_plex_type(type_: &str) -> Option<Self> {
        match type_ {
            "movie" => Some(SectionKind::Movie),
            "show" => Some(SectionKind::Show),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Movie => "movie",
            SectionKind::Show => "show",
        }
    }

    /// Numeric item type used by `section/{key}/all?type=`.
    pub fn item_type(&self) -> u8 {
        match self {
            SectionKind::Movie => 1,
            SectionKind::Show => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibrarySection {
    pub section_key: String,
    pub title: String,
    pub kind: SectionKind,
    pub agent: Option<String>,
    pub scanner: Option<String>,
    pub language: Option<String>,
    pub uuid: Option<String>,
    pub refreshing: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub scanned_at: Option<DateTime<Utc>>,
}
