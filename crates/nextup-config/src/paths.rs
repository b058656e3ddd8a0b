use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Explicit root override, checked before anything else.
pub const HOME_ENV: &str = "NEXTUP_HOME";
/// Root used inside the container image.
pub const CONTAINER_BASE_ENV: &str = "NEXTUP_BASE_PATH";

pub fn container_base_path() -> PathBuf {
    std::env::var_os(CONTAINER_BASE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/app"))
}

/// Everything nextup writes lives under one root:
///
/// ```text
/// <root>/config.toml
/// <root>/credentials.toml
/// <root>/data/nextup.db
/// ```
#[derive(Debug, Clone)]
pub struct PathManager {
    root: PathBuf,
}

impl PathManager {
    pub fn with_base(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$NEXTUP_HOME`, then the container base if it exists, then the
    /// platform config directory.
    pub fn resolve() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base(home));
        }
        let container = container_base_path();
        if container.is_dir() {
            return Ok(Self::with_base(container));
        }
        let platform = dirs::config_dir().context("Could not determine config directory")?;
        Ok(Self::with_base(platform.join("nextup")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.root.join("credentials.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.root.clone(), self.data_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

impl Default for PathManager {
    /// Falls back to the container base when no platform directory exists.
    fn default() -> Self {
        Self::resolve().unwrap_or_else(|_| Self::with_base(container_base_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = PathManager::with_base("/srv/nextup");
        assert_eq!(paths.root(), Path::new("/srv/nextup"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/nextup/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/nextup/credentials.toml"));
        assert_eq!(paths.data_dir(), PathBuf::from("/srv/nextup/data"));
    }

    #[test]
    fn test_ensure_directories_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().join("nextup"));
        paths.ensure_directories().unwrap();
        assert!(paths.root().is_dir());
        assert!(paths.data_dir().is_dir());
    }
}
