//! Configuration loading with TOML support
//!
//! Values come from (in increasing priority):
//! - built-in defaults
//! - a TOML file
//! - `CACHETORRENT_*` environment variables

use crate::error::{ElectionError, ElectionResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Complete configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Election parameters
    pub election: ElectionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Election parameters shared by every engine of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// Number of candidate registrations that triggers the election
    pub quorum_limit: usize,

    /// Percentage of each partition's candidates kept as leaders
    pub leader_percent: u32,

    /// Number of parallel overlay layers (1 = plain engine)
    pub layers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json, compact)
    pub format: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            quorum_limit: 100,
            leader_percent: 10,
            layers: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ElectionConfig {
    pub fn new(quorum_limit: usize, leader_percent: u32) -> Self {
        Self {
            quorum_limit,
            leader_percent,
            layers: 1,
        }
    }

    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    pub fn validate(&self) -> ElectionResult<()> {
        if self.quorum_limit == 0 {
            return Err(ElectionError::InvalidConfiguration {
                message: "quorum_limit must be at least 1".to_string(),
            });
        }
        if self.leader_percent > 100 {
            return Err(ElectionError::InvalidConfiguration {
                message: format!(
                    "leader_percent must be within 0..=100, got {}",
                    self.leader_percent
                ),
            });
        }
        if self.layers == 0 {
            return Err(ElectionError::InvalidConfiguration {
                message: "layers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ElectionResult<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            ElectionError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without env overrides or validation
    pub fn from_toml_str(contents: &str) -> ElectionResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> ElectionResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(limit) = parse_override(&lookup, "CACHETORRENT_QUORUM_LIMIT") {
            self.election.quorum_limit = limit;
        }
        if let Some(percent) = parse_override(&lookup, "CACHETORRENT_LEADER_PERCENT") {
            self.election.leader_percent = percent;
        }
        if let Some(layers) = parse_override(&lookup, "CACHETORRENT_LAYERS") {
            self.election.layers = layers;
        }
        if let Some(level) = lookup("CACHETORRENT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ElectionResult<()> {
        self.election.validate()?;

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ElectionError::ConfigError(format!(
                    "Invalid log level: {}",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            _ => {
                return Err(ElectionError::ConfigError(format!(
                    "Invalid log format: {}",
                    self.logging.format
                )))
            }
        }

        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
