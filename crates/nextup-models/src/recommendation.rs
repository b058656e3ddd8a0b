use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Episode,
    Movie,
}

/// What the picker hands back: enough denormalized fields to render a card
/// without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_rating_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i64>,
    pub summary: Option<String>,
    pub originally_available_at: Option<NaiveDate>,
    pub thumb: Option<String>,
    pub art: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_artwork: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_artwork: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_status: Option<String>,
    pub collections: Vec<String>,
}

impl Recommendation {
    /// "Show - S01E02 - Title" for episodes, "Title (1988)" style for movies.
    pub fn display_title(&self) -> String {
        match (self.kind, &self.show_title) {
            (RecommendationKind::Episode, Some(show)) => format!(
                "{} - S{:02}E{:02} - {}",
                show,
                self.season_number.unwrap_or(0),
                self.episode_number.unwrap_or(0),
                self.title
            ),
            _ => match self.originally_available_at {
                Some(date) => format!("{} ({})", self.title, date.format("%Y")),
                None => self.title.clone(),
            },
        }
    }
}
