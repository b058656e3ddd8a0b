use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use nextup_config::{Config, CredentialStore, PathManager};
use nextup_core::SeriesResolver;
use nextup_sources::{ComicVineClient, PlexHttpClient, TvdbClient};
use nextup_store::Store;
use std::sync::Arc;

/// Config, credentials and paths loaded once per command.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config.validate().wrap_err("Invalid configuration")?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    pub fn open_store(&self) -> Result<Store> {
        let path = self.config.database_path(&self.paths.data_dir());
        Store::open(&path).map_err(|e| eyre!("Failed to open database {}: {:#}", path.display(), e))
    }

    pub fn plex_client(&self) -> Result<PlexHttpClient> {
        let (url, token) = self.config.require_plex(&self.credentials)?;
        PlexHttpClient::new(&url, &token, self.config.plex.timeout())
            .map_err(|e| eyre!("Failed to create Plex client: {:#}", e))
    }

    /// `None` when TVDB is not enabled in config.
    pub fn tvdb_client(&self) -> Result<Option<TvdbClient>> {
        let Some((api_key, pin)) = self.config.tvdb_credentials(&self.credentials)? else {
            return Ok(None);
        };
        TvdbClient::new(api_key, pin)
            .map(Some)
            .map_err(|e| eyre!("Failed to create TVDB client: {:#}", e))
    }

    pub fn series_resolver(&self) -> Result<Option<SeriesResolver>> {
        Ok(self
            .tvdb_client()?
            .map(|client| SeriesResolver::new(Arc::new(client))))
    }

    pub fn comicvine_client(&self) -> Result<Option<ComicVineClient>> {
        let Some(api_key) = self.config.comicvine_api_key(&self.credentials)? else {
            return Ok(None);
        };
        ComicVineClient::new(api_key)
            .map(Some)
            .map_err(|e| eyre!("Failed to create ComicVine client: {:#}", e))
    }
}
