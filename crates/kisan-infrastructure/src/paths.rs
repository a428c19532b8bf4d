//! Unified path management for kisan files.
//!
//! ```text
//! ~/.config/kisan/             # Config directory (platform default)
//! ├── config.toml              # Application configuration
//! ├── history.json             # Last 10 answered queries
//! └── logs/                    # Application logs
//!     └── kisan.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "kisan";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for kisan_core::KisanError {
    fn from(err: PathError) -> Self {
        kisan_core::KisanError::config(err.to_string())
    }
}

/// Path resolution rooted either at the platform config directory or at an
/// explicit base directory (used by tests and `--data-dir`).
#[derive(Debug, Clone, Default)]
pub struct KisanPaths {
    base_dir: Option<PathBuf>,
}

impl KisanPaths {
    /// Creates a resolver. `None` uses the platform config directory.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the kisan configuration directory (e.g. `~/.config/kisan/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// The single storage key holding the persisted history.
    pub fn history_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("history.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
