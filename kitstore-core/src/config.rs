//! Configuration types
//!
//! Store and transport settings, loadable from TOML. The root-hash
//! extraction function is not configuration; it is passed to the store
//! constructor alongside a [`StoreConfig`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::SupportedVersion;

/// Default age past which a root refresh is attempted (1 hour).
pub const DEFAULT_SHOULD_REFRESH_SECS: u64 = 60 * 60;

/// Default age past which a root is refused outright (24 hours).
pub const DEFAULT_REQUIRE_REFRESH_SECS: u64 = 24 * 60 * 60;

fn default_should_refresh_secs() -> u64 {
    DEFAULT_SHOULD_REFRESH_SECS
}

/// Whole seconds, rounding any fraction up so a non-zero duration never
/// becomes zero.
fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

fn default_require_refresh_secs() -> u64 {
    DEFAULT_REQUIRE_REFRESH_SECS
}

/// Settings for one merkle store instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Human readable tag; also the persistent cache key.
    pub tag: String,
    /// Server endpoint serving kits for this tag.
    pub endpoint: String,
    /// Version looked up in the kit's table.
    pub supported_version: SupportedVersion,
    #[serde(default = "default_should_refresh_secs")]
    pub should_refresh_secs: u64,
    #[serde(default = "default_require_refresh_secs")]
    pub require_refresh_secs: u64,
    /// Load the kit from this file instead of the server. Debugging only;
    /// bypasses root verification entirely.
    #[serde(default)]
    pub kit_filename: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(
        tag: impl Into<String>,
        endpoint: impl Into<String>,
        supported_version: SupportedVersion,
    ) -> Self {
        Self {
            tag: tag.into(),
            endpoint: endpoint.into(),
            supported_version,
            should_refresh_secs: DEFAULT_SHOULD_REFRESH_SECS,
            require_refresh_secs: DEFAULT_REQUIRE_REFRESH_SECS,
            kit_filename: None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Thresholds are kept in whole seconds; fractions round up.
    pub fn with_should_refresh(mut self, duration: Duration) -> Self {
        self.should_refresh_secs = ceil_secs(duration);
        self
    }

    pub fn with_require_refresh(mut self, duration: Duration) -> Self {
        self.require_refresh_secs = ceil_secs(duration);
        self
    }

    pub fn with_kit_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.kit_filename = Some(path.into());
        self
    }

    pub fn should_refresh(&self) -> Duration {
        Duration::from_secs(self.should_refresh_secs)
    }

    pub fn require_refresh(&self) -> Duration {
        Duration::from_secs(self.require_refresh_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tag",
                reason: "must not be empty".to_string(),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        if self.require_refresh_secs <= self.should_refresh_secs {
            return Err(ConfigError::InvalidValue {
                field: "require_refresh_secs",
                reason: format!(
                    "must be greater than should_refresh_secs ({})",
                    self.should_refresh_secs
                ),
            });
        }
        if let Some(path) = &self.kit_filename {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "kit_filename",
                    reason: "must not be empty when set".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Settings for the HTTP kit transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_ms: 30_000,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
