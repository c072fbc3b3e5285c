pub mod env;

use crate::error::config::ConfigError;
use crate::host::OriginPolicy;

use common::ErrorLocation;

use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base path of the platform API; the identity check is `{base}/me`.
    pub api_base_path: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted token slot.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Origins allowed to push tokens. Empty accepts any origin.
    #[serde(default)]
    pub allowed_parent_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub host: HostConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            host: HostConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_request_timeout_secs() -> u64 {
    30
}

// ============================================
// IMPLEMENTATION
// ============================================

impl SessionConfig {
    /// Load `{config_dir}/config.json`.
    ///
    /// A missing file yields defaults. A file that exists but cannot be read,
    /// parsed or validated is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let contents = match fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No session config at {}, using defaults",
                    config_path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                warn!("Failed to read session config: {e}");
                return Err(ConfigError::read(&config_path, e));
            }
        };

        let config: SessionConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse session config: {e}");
            ConfigError::parse(&config_path, e.to_string())
        })?;

        config.validate()?;

        info!("Session config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Write `{config_dir}/config.json` through a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        fs::create_dir_all(config_dir).map_err(|e| ConfigError::write(config_dir, e))?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        fs::write(&temp_path, json).map_err(|e| ConfigError::write(&temp_path, e))?;
        fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::write(&config_path, e))?;

        info!("Session config saved to {}", config_path.display());
        Ok(())
    }

    /// Check version, timeout range and every configured URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=CONFIG_VERSION).contains(&self.version) {
            return Err(ConfigError::validation(format!(
                "Unsupported config version {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.api.request_timeout_secs) {
            return Err(ConfigError::validation(format!(
                "Invalid request timeout: {}s (must be 1-{MAX_REQUEST_TIMEOUT_SECS})",
                self.api.request_timeout_secs
            )));
        }

        if let Some(base_path) = &self.api.api_base_path {
            validate_http_url("api_base_path", base_path)?;
        }

        for origin in &self.host.allowed_parent_origins {
            validate_http_url("allowed_parent_origins", origin)?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn origin_policy(&self) -> OriginPolicy {
        OriginPolicy::from_allowed(&self.host.allowed_parent_origins)
    }
}

#[track_caller]
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::validation(format!("{field} cannot be empty")));
    }

    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::validation(format!("Invalid URL for {field}: {value} ({e})")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::validation(format!(
            "{field} must be an http(s) URL: {value}"
        )));
    }

    Ok(())
}
