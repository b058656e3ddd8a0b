//! Local SQLite store for synced library metadata, settings and custom orders.

mod entities;
mod relations;
pub mod schema;
mod selection;
mod settings;
mod store;

pub use settings::parse_collection_list;
pub use store::Store;
