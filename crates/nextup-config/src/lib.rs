pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ComicVineConfig, Config, ConfigError, DatabaseConfig, PlexConfig, SchedulerConfig, SelectionConfig, TvdbConfig, default_scheduler_config};
pub use credentials::{Credential, CredentialStore};
pub use paths::{PathManager, container_base_path};
