//! # Configuration
//!
//! Runtime settings for the feeding tracker, read from a YAML file.
//!
//! ## Sources
//!
//! - `FEEDING_TRACKER_CONFIG`: path of the YAML file; without it every
//!   setting takes its default
//! - `FEEDING_TRACKER_RESET_HOUR`: overrides `reset_hour` from the file
//!
//! ## YAML Format
//!
//! ```yaml
//! reset_hour: 7
//! history_limit: 50
//! caretakers: [Africa, Dani, Garnet]
//! owner: "household-1"
//! bind_address: "127.0.0.1:3000"
//! storage:
//!   backend: sqlite
//!   url: "sqlite:/var/lib/feeding-tracker/feeding.db"
//! ```
//!
//! Missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::domain::{DEFAULT_HISTORY_LIMIT, DEFAULT_RESET_HOUR};

pub const CONFIG_PATH_ENV: &str = "FEEDING_TRACKER_CONFIG";
pub const RESET_HOUR_ENV: &str = "FEEDING_TRACKER_RESET_HOUR";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_CARETAKERS: [&str; 8] = ["Africa", "Dani", "Garnet", "Leonyx", "Salem", "Siahh", "Tats", "Yose"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error("reset_hour must be between 0 and 23, got {0}")]
    InvalidResetHour(u32),
    #[error("history_limit must be at least 1")]
    InvalidHistoryLimit,
    #[error("Invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

/// Where feeding state and history are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    File { directory: PathBuf },
    Sqlite { url: String },
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        StorageConfig::File {
            directory: base.join("feeding-tracker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Local hour (0-23) from which a previous day's state is cleared
    pub reset_hour: u32,
    /// Maximum number of history records kept
    pub history_limit: usize,
    /// Names offered when marking a slot done
    pub caretakers: Vec<String>,
    /// Optional id stamped on every stored row
    pub owner: Option<String>,
    pub bind_address: String,
    pub storage: StorageConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reset_hour: DEFAULT_RESET_HOUR,
            history_limit: DEFAULT_HISTORY_LIMIT,
            caretakers: DEFAULT_CARETAKERS.iter().map(|name| name.to_string()).collect(),
            owner: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read environment variables
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => {
                info!("{} not set, using default configuration", CONFIG_PATH_ENV);
                Self::default()
            }
        };
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid, all-default config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(RESET_HOUR_ENV) {
            self.reset_hour = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: RESET_HOUR_ENV,
                value: value.clone(),
            })?;
            info!("Reset hour overridden to {} by {}", self.reset_hour, RESET_HOUR_ENV);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_hour > 23 {
            return Err(ConfigError::InvalidResetHour(self.reset_hour));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.bind_address.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::load_with(env(&[])).unwrap();
        assert_eq!(config.reset_hour, 7);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.caretakers.len(), 8);
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
        assert!(matches!(config.storage, StorageConfig::File { .. }));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TrackerConfig::from_yaml_str(
            r#"
reset_hour: 5
storage:
  backend: sqlite
  url: "sqlite::memory:"
"#,
        )
        .unwrap();

        assert_eq!(config.reset_hour, 5);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.storage, StorageConfig::Sqlite { url: "sqlite::memory:".to_string() });
    }

    #[test]
    fn test_memory_backend_and_caretakers() {
        let config = TrackerConfig::from_yaml_str(
            r#"
caretakers: [Salem, Tats]
owner: household-1
storage:
  backend: memory
"#,
        )
        .unwrap();

        assert_eq!(config.caretakers, vec!["Salem", "Tats"]);
        assert_eq!(config.owner.as_deref(), Some("household-1"));
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "reset_hour: 6\nhistory_limit: 10\n").unwrap();
        let path = path.to_string_lossy().to_string();

        let config =
            TrackerConfig::load_with(env(&[(CONFIG_PATH_ENV, path.as_str()), (RESET_HOUR_ENV, "9")])).unwrap();

        assert_eq!(config.reset_hour, 9);
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = TrackerConfig::load_with(env(&[(CONFIG_PATH_ENV, "/nonexistent/feeding.yaml")]));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_validation() {
        let result = TrackerConfig::load_with(env(&[(RESET_HOUR_ENV, "24")]));
        assert!(matches!(result, Err(ConfigError::InvalidResetHour(24))));

        let result = TrackerConfig::load_with(env(&[(RESET_HOUR_ENV, "seven")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));

        let config = TrackerConfig {
            history_limit: 0,
            ..TrackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHistoryLimit)));

        let config = TrackerConfig {
            bind_address: "localhost".to_string(),
            ..TrackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBindAddress(_))));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result = TrackerConfig::from_yaml_str("storage:\n  backend: postgres\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
