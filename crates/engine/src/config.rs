//! Configuration
//!
//! Loaded from TOML. Every section and field is optional:
//!
//! ```toml
//! [store]
//! first_record_id = 1
//! first_txn_id = 1
//!
//! [log]
//! filter = "info"
//!
//! [demo]
//! default_name = "John Doe"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use txprop_core::{validate_name, Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Id allocation
    pub store: StoreConfig,
    /// Log filter for the binary
    pub log: LogConfig,
    /// Demo scenario inputs
    pub demo: DemoConfig,
}

/// Where identities start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// First id handed to a saved record
    pub first_record_id: u64,
    /// First transaction id
    pub first_txn_id: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            first_record_id: 1,
            first_txn_id: 1,
        }
    }
}

/// Logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Demo scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Name used when a scenario is run without `--name`
    pub default_name: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            default_name: "John Doe".to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.store.first_record_id == 0 {
            return Err(Error::Config("store.first_record_id must be at least 1".into()));
        }
        if self.store.first_txn_id == 0 {
            return Err(Error::Config("store.first_txn_id must be at least 1".into()));
        }
        validate_name(&self.demo.default_name)
            .map_err(|_| Error::Config("demo.default_name must not be empty".into()))
    }
}
