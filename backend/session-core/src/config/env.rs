//! Environment overrides for [`SessionConfig`](super::SessionConfig).
//!
//! `.env` is loaded from the current directory or next to the executable
//! (missing file is fine), then these variables override file values:
//!
//! - `JOBTRACK_API_BASE_PATH`
//! - `JOBTRACK_DATA_DIR`
//! - `JOBTRACK_ALLOWED_ORIGINS` (comma separated)

use super::SessionConfig;
use crate::ENV_PREFIX;
use crate::storage::paths::DATA_DIR_ENV;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const API_BASE_PATH_ENV: &str = const_format::concatcp!(ENV_PREFIX, "API_BASE_PATH");
pub const ALLOWED_ORIGINS_ENV: &str = const_format::concatcp!(ENV_PREFIX, "ALLOWED_ORIGINS");

/// Load `.env` from the current directory, then from next to the executable.
///
/// Returns the path of the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let exe_path = env::current_exe().ok()?;
    let env_path = exe_path.parent()?.join(".env");
    if !env_path.exists() {
        debug!("No .env file found - using existing environment variables");
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => Some(env_path),
        Err(e) => {
            warn!("Failed to parse .env at {}: {e}", env_path.display());
            None
        }
    }
}

impl SessionConfig {
    /// Apply `JOBTRACK_*` environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(base_path) = read_var(API_BASE_PATH_ENV) {
            info!("API base path overridden by {API_BASE_PATH_ENV}");
            self.api.api_base_path = Some(base_path);
        }

        if let Some(data_dir) = read_var(DATA_DIR_ENV) {
            info!("Data directory overridden by {DATA_DIR_ENV}");
            self.storage.data_dir = Some(PathBuf::from(data_dir));
        }

        if let Some(origins) = read_var(ALLOWED_ORIGINS_ENV) {
            self.host.allowed_parent_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
            info!(
                "Allowed parent origins overridden by {ALLOWED_ORIGINS_ENV} ({} entries)",
                self.host.allowed_parent_origins.len()
            );
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
        Ok(_) => None,
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("Env var {name} contains invalid unicode, ignoring");
            None
        }
    }
}
