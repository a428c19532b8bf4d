//! Loads and saves `config.toml`.

use std::path::PathBuf;

use kisan_core::Result;
use kisan_core::config::AppConfig;

use crate::paths::KisanPaths;
use crate::storage::AtomicFile;

/// Service for reading the application configuration.
///
/// A missing or empty file yields `AppConfig::default()`; a malformed file is an error.
pub struct ConfigService {
    file: AtomicFile<AppConfig>,
}

impl ConfigService {
    pub fn new(paths: &KisanPaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::toml(path),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    pub fn load(&self) -> Result<AppConfig> {
        match self.file.load()? {
            Some(config) => {
                tracing::info!("[Config] Loaded {}", self.file.path().display());
                Ok(config)
            }
            None => {
                tracing::info!(
                    "[Config] No config at {}, using defaults",
                    self.file.path().display()
                );
                Ok(AppConfig::default())
            }
        }
    }

    /// Writes the default configuration if no file exists yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.file.path().exists() {
            self.file.save(&AppConfig::default())?;
            tracing::info!("[Config] Wrote default config to {}", self.file.path().display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kisan_core::config::FetcherMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_ensure_exists_round_trips_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        service.ensure_exists().unwrap();
        assert!(service.path().exists());
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_reads_remote_mode() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[fetcher]\nmode = \"remote\"\nendpoint = \"http://localhost:8080/ask\"\n",
        )
        .unwrap();

        let config = ConfigService::with_path(path).load().unwrap();
        assert_eq!(config.fetcher.mode, FetcherMode::Remote);
        assert_eq!(config.fetcher.endpoint.as_deref(), Some("http://localhost:8080/ask"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[fetcher\nmode = ").unwrap();
        let err = ConfigService::with_path(path).load().unwrap_err();
        assert!(err.is_serialization());
    }
}
