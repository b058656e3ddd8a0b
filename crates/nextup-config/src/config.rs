use crate::credentials::{Credential, CredentialStore};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration problems are reported before any upstream call is made.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Plex server URL is not configured. Run 'nextup config plex' first")]
    MissingPlexServerUrl,
    #[error("Plex token not found in credentials. Run 'nextup config plex' first")]
    MissingPlexToken,
    #[error("TVDB is enabled but no API key is stored. Run 'nextup config tvdb' first")]
    MissingTvdbApiKey,
    #[error("ComicVine is enabled but no API key is stored. Run 'nextup config comicvine' first")]
    MissingComicVineApiKey,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub tvdb: Option<TvdbConfig>,
    #[serde(default)]
    pub comicvine: Option<ComicVineConfig>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct PlexConfig {
    #[serde(default)]
    pub server_url: String,
    /// Per-request timeout for media server calls.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl PlexConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(Self::DEFAULT_TIMEOUT_SECS))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TvdbConfig {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComicVineConfig {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct DatabaseConfig {
    /// Defaults to `<data_dir>/nextup.db` when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
    /// Used when the interval stored in settings cannot be read.
    #[serde(default = "default_interval_hours")]
    pub default_interval_hours: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SelectionConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_hours() -> u32 {
    12
}

fn default_max_attempts() -> usize {
    100
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        run_on_startup: default_true(),
        default_interval_hours: default_interval_hours(),
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Missing file means defaults; a file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match path.exists() {
            true => Self::load_from_file(path),
            false => Ok(Self::default()),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let rendered = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.max_attempts == 0 {
            return Err(ConfigError::Invalid("selection.max_attempts must be at least 1".to_string()));
        }

        if let Some(ref scheduler) = self.scheduler {
            if scheduler.default_interval_hours == 0 {
                return Err(ConfigError::Invalid(
                    "scheduler.default_interval_hours must be at least 1".to_string(),
                ));
            }
        }

        let url = self.plex.server_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "plex.server_url must start with http:// or https://, got '{}'",
                url
            )));
        }

        Ok(())
    }

    /// Server URL and token, or the configuration error explaining which is missing.
    pub fn require_plex(&self, credentials: &CredentialStore) -> Result<(String, String), ConfigError> {
        let url = self.plex.server_url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ConfigError::MissingPlexServerUrl);
        }
        let token = credentials
            .get(Credential::PlexToken)
            .ok_or(ConfigError::MissingPlexToken)?;
        Ok((url.to_string(), token.clone()))
    }

    /// TVDB credentials when TVDB is enabled; `Ok(None)` when it is switched off.
    pub fn tvdb_credentials(
        &self,
        credentials: &CredentialStore,
    ) -> Result<Option<(String, Option<String>)>, ConfigError> {
        match self.tvdb {
            Some(ref tvdb) if tvdb.enabled => {
                let key = credentials
                    .get(Credential::TvdbApiKey)
                    .ok_or(ConfigError::MissingTvdbApiKey)?;
                Ok(Some((key.clone(), credentials.get(Credential::TvdbPin).cloned())))
            }
            _ => Ok(None),
        }
    }

    pub fn comicvine_api_key(&self, credentials: &CredentialStore) -> Result<Option<String>, ConfigError> {
        match self.comicvine {
            Some(ref comicvine) if comicvine.enabled => credentials
                .get(Credential::ComicVineApiKey)
                .cloned()
                .map(Some)
                .ok_or(ConfigError::MissingComicVineApiKey),
            _ => Ok(None),
        }
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join("nextup.db"))
    }

    pub fn scheduler_or_default(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_else(default_scheduler_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn credentials_with(entries: &[(Credential, &str)]) -> CredentialStore {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        for (credential, value) in entries {
            store.set(*credential, value.to_string());
        }
        store
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            plex: PlexConfig {
                server_url: "http://localhost:32400".to_string(),
                timeout_secs: Some(30),
            },
            tvdb: Some(TvdbConfig { enabled: true }),
            comicvine: None,
            database: DatabaseConfig::default(),
            scheduler: Some(default_scheduler_config()),
            selection: SelectionConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.plex.server_url, "http://localhost:32400");
        assert_eq!(loaded.plex.timeout_secs, Some(30));
        assert!(loaded.tvdb.unwrap().enabled);
        assert_eq!(loaded.selection.max_attempts, 100);
        assert_eq!(loaded.scheduler.unwrap().default_interval_hours, 12);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: Config = toml::from_str("[plex]\nserver_url = \"http://plex:32400\"\n").unwrap();
        assert_eq!(config.selection.max_attempts, 100);
        assert!(config.tvdb.is_none());
        assert!(config.scheduler_or_default().run_on_startup);
    }

    #[test]
    fn test_require_plex_fails_fast() {
        let config = Config::default();
        let creds = credentials_with(&[(Credential::PlexToken, "abc")]);
        assert_eq!(config.require_plex(&creds), Err(ConfigError::MissingPlexServerUrl));

        let config = Config {
            plex: PlexConfig {
                server_url: "http://plex:32400/".to_string(),
                timeout_secs: None,
            },
            ..Config::default()
        };
        let empty = credentials_with(&[]);
        assert_eq!(config.require_plex(&empty), Err(ConfigError::MissingPlexToken));

        let (url, token) = config.require_plex(&creds).unwrap();
        assert_eq!(url, "http://plex:32400");
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_tvdb_credentials() {
        let mut config = Config::default();
        let creds = credentials_with(&[]);
        assert_eq!(config.tvdb_credentials(&creds), Ok(None));

        config.tvdb = Some(TvdbConfig { enabled: true });
        assert_eq!(config.tvdb_credentials(&creds), Err(ConfigError::MissingTvdbApiKey));

        let creds = credentials_with(&[(Credential::TvdbApiKey, "key"), (Credential::TvdbPin, "1234")]);
        assert_eq!(
            config.tvdb_credentials(&creds),
            Ok(Some(("key".to_string(), Some("1234".to_string()))))
        );
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.plex.server_url = "plex:32400".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.plex.server_url = "https://plex.example".to_string();
        config.selection.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert_eq!(
            config.database_path(Path::new("/data")),
            PathBuf::from("/data/nextup.db")
        );
    }
}
