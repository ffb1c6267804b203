//! Compression configuration
//!
//! Tunables for scheme selection and the individual encoders. A config is
//! usually built from defaults, optionally loaded from JSON, and then patched
//! from the environment.

use crate::common::constants::{
    DEFAULT_MAX_DICTIONARY_SIZE, DEFAULT_MAX_SAMPLE_SIZE, ENV_ENABLED, ENV_MAX_DICTIONARY_SIZE,
    ENV_SAMPLE_SIZE, MAX_DICTIONARY_CODES,
};
use crate::common::error::{ColumnarError, ColumnarResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for scheme selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable scheme selection; when false every column is stored as-is
    pub enabled: bool,

    /// Number of leading values encoded by each candidate during selection
    pub max_sample_size: usize,

    /// Distinct values a dictionary may hold before it overflows
    pub max_dictionary_size: usize,

    /// Longest run stored in a single run-length pair
    pub max_run_length: u32,

    /// Winning size must be below this fraction of the pass-through size,
    /// otherwise the column is stored as-is
    ///
    /// `None` accepts any winner.
    pub max_compression_ratio: Option<f64>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            max_dictionary_size: DEFAULT_MAX_DICTIONARY_SIZE,
            max_run_length: u32::MAX,
            max_compression_ratio: None,
        }
    }
}

impl CompressionConfig {
    /// Configuration that stores every column without compression
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Parses and validates a JSON configuration
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> ColumnarResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> ColumnarResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Applies overrides from `PRISM_COLUMNAR_*` environment variables
    pub fn with_env_overrides(self) -> ColumnarResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name
    ///
    /// Unparseable values are rejected rather than ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> ColumnarResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup(ENV_ENABLED) {
            self.enabled = match enabled.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                other => {
                    return Err(ColumnarError::Config(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_ENABLED, other
                    )))
                }
            };
        }
        if let Some(size) = lookup(ENV_SAMPLE_SIZE) {
            self.max_sample_size = parse_usize(ENV_SAMPLE_SIZE, &size)?;
        }
        if let Some(size) = lookup(ENV_MAX_DICTIONARY_SIZE) {
            self.max_dictionary_size = parse_usize(ENV_MAX_DICTIONARY_SIZE, &size)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validates configuration
    pub fn validate(&self) -> ColumnarResult<()> {
        if self.max_sample_size == 0 {
            return Err(ColumnarError::Config(
                "max_sample_size must be positive".to_string(),
            ));
        }

        if self.max_dictionary_size == 0 || self.max_dictionary_size > MAX_DICTIONARY_CODES {
            return Err(ColumnarError::Config(format!(
                "max_dictionary_size must be in 1..={}, got {}",
                MAX_DICTIONARY_CODES, self.max_dictionary_size
            )));
        }

        if self.max_run_length == 0 {
            return Err(ColumnarError::Config(
                "max_run_length must be positive".to_string(),
            ));
        }

        if let Some(ratio) = self.max_compression_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ColumnarError::Config(format!(
                    "max_compression_ratio must be in (0, 1], got {}",
                    ratio
                )));
            }
        }

        Ok(())
    }
}

fn parse_usize(key: &str, value: &str) -> ColumnarResult<usize> {
    value.trim().parse().map_err(|_| {
        ColumnarError::Config(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}
