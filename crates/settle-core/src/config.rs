use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{SettleError, SettleResult};
use crate::merge::MergeOptions;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "SETTLE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "settle.toml";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleConfig {
    #[serde(default)]
    pub merge: MergeOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SettleConfig {
    /// Load from `SETTLE_CONFIG_PATH` (default `settle.toml`) and apply
    /// environment overrides. A missing file falls back to the defaults.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read or parsed, or the resulting
    /// configuration is invalid.
    pub fn load() -> SettleResult<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)?.apply_env_overrides().validated()
    }

    /// Load a configuration file without environment overrides.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> SettleResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Configuration file '{}' not found. Using default configuration.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(SettleError::io(path, &err)),
        }
    }

    /// Parse a TOML document; omitted sections and keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`SettleError::Configuration`] for malformed TOML or unknown values.
    pub fn from_toml_str(contents: &str) -> SettleResult<Self> {
        toml::from_str(contents).map_err(|e| SettleError::Configuration {
            message: e.to_string(),
            setting: None,
        })
    }

    /// Apply `SETTLE_*` environment variable overrides.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source. Values that fail to
    /// parse are ignored with a warning.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut applied = 0;
        if let Some(identity_key) = lookup("SETTLE_IDENTITY_KEY") {
            self.merge.identity_key = identity_key;
            applied += 1;
        }
        if let Some(policy) = lookup("SETTLE_UNMATCHED_ARRAYS") {
            match policy.parse() {
                Ok(policy) => {
                    self.merge.unmatched_arrays = policy;
                    applied += 1;
                }
                Err(err) => warn!("Ignoring SETTLE_UNMATCHED_ARRAYS: {}", err),
            }
        }
        if let Some(filter) = lookup("SETTLE_LOG_FILTER") {
            self.logging.filter = filter;
            applied += 1;
        }
        if let Some(json) = lookup("SETTLE_LOG_JSON") {
            match json.parse::<bool>() {
                Ok(json) => {
                    self.logging.json = json;
                    applied += 1;
                }
                Err(_) => warn!("Ignoring SETTLE_LOG_JSON: '{}' is not a boolean", json),
            }
        }

        if applied > 0 {
            info!(
                applied,
                identity_key = %self.merge.identity_key,
                unmatched_arrays = ?self.merge.unmatched_arrays,
                "Applied configuration overrides"
            );
        }
        self
    }

    /// Reject configurations the merge cannot work with.
    ///
    /// # Errors
    ///
    /// [`SettleError::Configuration`] for an empty identity key.
    pub fn validated(self) -> SettleResult<Self> {
        if self.merge.identity_key.trim().is_empty() {
            return Err(SettleError::configuration(
                "merge.identity_key",
                "identity key must not be empty",
            ));
        }
        Ok(self)
    }
}

fn default_log_filter() -> String {
    "settle=info".to_string()
}
