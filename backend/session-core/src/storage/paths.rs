//! Platform-aware detection of the jobtrack data directory.
//!
//! Lookup order:
//! 1. Explicit directory from configuration
//! 2. `JOBTRACK_DATA_DIR` environment variable
//! 3. Platform-specific data directory via `dirs` crate
//! 4. `$HOME`-based fallback
//!
//! Returns Result, never silently falls back to a wrong path.

use crate::error::StorageError;
use crate::{APP_DIR_NAME, ENV_PREFIX};

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

pub const DATA_DIR_ENV: &str = const_format::concatcp!(ENV_PREFIX, "DATA_DIR");

#[derive(Debug, Clone)]
pub struct DataDirectory {
    pub path: PathBuf,
    pub source: DataDirSource,
}

/// How the path was determined (for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirSource {
    Config,
    EnvVar,
    PlatformDefault,
    HomeFallback,
}

impl std::fmt::Display for DataDirSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataDirSource::Config => write!(f, "config"),
            DataDirSource::EnvVar => write!(f, "{DATA_DIR_ENV}"),
            DataDirSource::PlatformDefault => write!(f, "platform default"),
            DataDirSource::HomeFallback => write!(f, "home fallback"),
        }
    }
}

/// Detect where the token slot lives.
///
/// # Errors
/// Returns `StorageError::DataDirDetection` if no candidate can be determined.
pub fn detect_data_dir(configured: Option<&Path>) -> Result<DataDirectory, StorageError> {
    if let Some(dir) = configured {
        debug!("Using configured data dir: {:?}", dir);
        return Ok(DataDirectory {
            path: dir.to_path_buf(),
            source: DataDirSource::Config,
        });
    }

    if let Ok(custom_dir) = env::var(DATA_DIR_ENV) {
        if !custom_dir.trim().is_empty() {
            info!("Using {DATA_DIR_ENV} override: {:?}", custom_dir);
            return Ok(DataDirectory {
                path: PathBuf::from(custom_dir),
                source: DataDirSource::EnvVar,
            });
        }
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        let path = data_dir.join(APP_DIR_NAME);
        debug!("Platform data dir: {:?}", path);
        return Ok(DataDirectory {
            path,
            source: DataDirSource::PlatformDefault,
        });
    }

    if let Some(home) = dirs::home_dir() {
        let path = home.join(format!(".{APP_DIR_NAME}"));
        warn!("Using home fallback path: {:?}", path);
        return Ok(DataDirectory {
            path,
            source: DataDirSource::HomeFallback,
        });
    }

    Err(StorageError::data_dir_detection(format!(
        "Cannot determine data directory. Set {DATA_DIR_ENV} environment variable."
    )))
}
