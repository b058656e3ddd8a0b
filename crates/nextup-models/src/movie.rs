use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub rating_key: String,
    pub section_key: Option<String>,
    pub guid: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub tagline: Option<String>,
    pub summary: Option<String>,
    pub studio: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<f64>,
    pub audience_rating: Option<f64>,
    pub duration: Option<i64>,
    pub originally_available_at: Option<NaiveDate>,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumb: Option<String>,
    pub art: Option<String>,
    /// Collection names in upstream order.
    pub collections: Vec<String>,
}

impl Movie {
    pub fn is_unplayed(&self) -> bool {
        self.view_count == 0
    }
}
