//! Configuration file for the `chronoweave` binary
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "strategy": "weaver",
//!   "namespace": "VW",
//!   "weaver": { "bridge_backfill": true }
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};
use crate::weaver::WeaverConfig;

use super::errors::{CliError, CliResult};

/// Chain strategy an index is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Plain chronological chains
    Linear,
    /// Skip-ladder chains
    Ladder,
    /// Skip-ladder chains with cross-key bridges
    #[default]
    Weaver,
}

impl Strategy {
    /// Every strategy, in benchmark order.
    pub const ALL: [Strategy; 3] = [Strategy::Linear, Strategy::Ladder, Strategy::Weaver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Linear => "linear",
            Strategy::Ladder => "ladder",
            Strategy::Weaver => "weaver",
        }
    }

    /// Store namespace a benchmark run of this strategy writes under.
    pub fn bench_namespace(&self) -> &'static str {
        match self {
            Strategy::Linear => "LL",
            Strategy::Ladder => "FSL",
            Strategy::Weaver => "VW",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `data/nodes.kv` (required)
    pub data_dir: PathBuf,

    /// Chain strategy (default: weaver)
    #[serde(default)]
    pub strategy: Strategy,

    /// Key prefix of every record the index writes (default: "VW")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Bridge settings, read only by the weaver strategy
    #[serde(default)]
    pub weaver: WeaverConfig,
}

fn default_namespace() -> String {
    "VW".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config = Self::from_json(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("data_dir", &config.data_dir.display().to_string()),
                ("strategy", config.strategy.as_str()),
            ],
        );
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.namespace.is_empty() {
            return Err(CliError::config_error("namespace must not be empty"));
        }

        // ':' separates namespace, key and version in record keys
        if self.namespace.contains(':') {
            return Err(CliError::config_error(format!(
                "Invalid namespace '{}': must not contain ':'",
                self.namespace
            )));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }
}
