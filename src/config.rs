use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid base_url '{0}'")]
    InvalidBaseUrl(String),
}

/// When a field update reaches the local list.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Apply locally as soon as the change is requested; failures are only logged.
    Optimistic,
    /// Apply locally once the store acknowledges the change.
    Confirmed,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SyncPolicy {
    pub category: UpdatePolicy,
    pub completion: UpdatePolicy,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            category: UpdatePolicy::Optimistic,
            completion: UpdatePolicy::Confirmed,
        }
    }
}

impl SyncPolicy {
    /// Both fields follow `policy`.
    pub fn uniform(policy: UpdatePolicy) -> Self {
        Self {
            category: policy,
            completion: policy,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InboxConfig {
    pub base_url: String,
    pub debug_logging: bool,
    pub sync_policy: SyncPolicy,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debug_logging: false,
            sync_policy: SyncPolicy::default(),
        }
    }
}

impl InboxConfig {
    /// `~/.config/inbox/config.json` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("inbox")
            .join("config.json")
    }

    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if reqwest::Url::parse(config.base_url.trim()).is_err() {
            return Err(ConfigError::InvalidBaseUrl(config.base_url));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(io_err)
    }
}
