pub mod collection;
pub mod library;
pub mod movie;
pub mod recommendation;
pub mod relations;
pub mod settings;
pub mod show;
pub mod summary;

pub use collection::normalize_collection_name;
pub use library::{LibrarySection, SectionKind};
pub use movie::Movie;
pub use recommendation::{Recommendation, RecommendationKind};
pub use relations::{ChildRelations, ImageRef, MediaStream, ParentRef, RatingEntry, RoleEntry, UltraBlurColors};
pub use settings::{CustomOrderItem, MediaKind, Settings, DEFAULT_SYNC_INTERVAL_HOURS, MAX_SYNC_INTERVAL_HOURS};
pub use show::{Episode, Season, Show};
pub use summary::SyncSummary;
