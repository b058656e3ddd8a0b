use serde::{Deserialize, Serialize};

/// Result of one full sync pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncSummary {
    pub sections: usize,
    pub total_shows: usize,
    pub total_seasons: usize,
    pub total_episodes: usize,
    pub total_movies: usize,
    /// Items that fell back to bulk-list data because the detail fetch failed.
    pub degraded_items: usize,
    /// Parents whose child relations could not be replaced.
    pub child_failures: usize,
    pub duration_ms: u64,
}
