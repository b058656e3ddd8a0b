use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Secrets kept out of `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    PlexToken,
    TvdbApiKey,
    TvdbPin,
    ComicVineApiKey,
}

impl Credential {
    /// Key in `credentials.toml`.
    pub fn key(&self) -> &'static str {
        match self {
            Credential::PlexToken => "plex_token",
            Credential::TvdbApiKey => "tvdb_api_key",
            Credential::TvdbPin => "tvdb_pin",
            Credential::ComicVineApiKey => "comicvine_api_key",
        }
    }
}

/// Flat `key = "value"` TOML file. Unknown keys are preserved on save.
pub struct CredentialStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: BTreeMap::new(),
        }
    }

    /// A missing file leaves the store empty.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        self.values = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    /// Empty values read as unset.
    pub fn get(&self, credential: Credential) -> Option<&String> {
        self.values.get(credential.key()).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, credential: Credential, value: String) {
        self.values.insert(credential.key().to_string(), value);
    }

    pub fn remove(&mut self, credential: Credential) {
        self.values.remove(credential.key());
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::new(path.clone());
        store.set(Credential::PlexToken, "plex-abc".to_string());
        store.set(Credential::TvdbApiKey, "tvdb-key".to_string());
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.get(Credential::PlexToken).map(String::as_str), Some("plex-abc"));
        assert_eq!(loaded.get(Credential::TvdbApiKey).map(String::as_str), Some("tvdb-key"));
        assert!(loaded.get(Credential::TvdbPin).is_none());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "legacy_key = \"x\"\nplex_token = \"t\"\n").unwrap();

        let mut store = CredentialStore::new(path.clone());
        store.load().unwrap();
        store.remove(Credential::PlexToken);
        store.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("legacy_key"));
        assert!(!content.contains("plex_token"));
    }

    #[test]
    fn test_empty_value_reads_as_missing() {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.set(Credential::ComicVineApiKey, String::new());
        assert!(store.get(Credential::ComicVineApiKey).is_none());
        assert!(store.load().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        let mut store = CredentialStore::new(path.clone());
        store.set(Credential::TvdbPin, "1234".to_string());
        store.save().unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
