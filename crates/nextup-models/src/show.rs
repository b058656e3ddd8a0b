use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub rating_key: String,
    pub section_key: Option<String>,
    pub guid: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub studio: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<f64>,
    pub audience_rating: Option<f64>,
    pub originally_available_at: Option<NaiveDate>,
    pub child_count: Option<i64>,
    pub leaf_count: Option<i64>,
    pub viewed_leaf_count: Option<i64>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumb: Option<String>,
    pub art: Option<String>,
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub rating_key: String,
    pub show_rating_key: String,
    pub title: String,
    pub index: Option<i64>,
    pub summary: Option<String>,
    pub leaf_count: Option<i64>,
    pub viewed_leaf_count: Option<i64>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumb: Option<String>,
    pub art: Option<String>,
}

/// An episode row. Show title and season/episode numbers are copied from the
/// parents so chronological queries never need a join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub rating_key: String,
    pub season_rating_key: String,
    pub show_rating_key: String,
    pub show_title: String,
    pub season_index: i64,
    pub episode_index: i64,
    pub title: String,
    pub summary: Option<String>,
    pub content_rating: Option<String>,
    pub duration: Option<i64>,
    pub originally_available_at: Option<NaiveDate>,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumb: Option<String>,
    pub art: Option<String>,
}

impl Episode {
    pub fn is_unplayed(&self) -> bool {
        self.view_count == 0
    }
}
