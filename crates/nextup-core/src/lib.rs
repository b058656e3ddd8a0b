pub mod collections;
pub mod matching;
pub mod progress;
pub mod resolver;
pub mod scheduler;
pub mod selection;
pub mod sync;
#[cfg(test)]
mod testing;

pub use matching::{best_match, score, ScoredMatch};
pub use progress::{NoopProgress, SyncProgress};
pub use resolver::{ResolvedSeries, SeriesResolver};
pub use scheduler::{BackgroundSync, SchedulerError, SyncJob, SyncStatus};
pub use selection::{SelectionEngine, SelectionError};
pub use sync::{DetailOutcome, PlexSync};
