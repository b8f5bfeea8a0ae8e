use std::f64::consts::FRAC_PI_8;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Parameters for the demonstration ring structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of anchors spaced evenly around the equator.
    pub ring_size: usize,
    /// Mass given to every anchor.
    pub anchor_mass: f64,
    /// Polar offset of the pendant anchor from the first ring anchor.
    pub spoke_offset: f64,
    /// Whether the last ring anchor is joined back to the first.
    pub close_ring: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ring_size: 4,
            anchor_mass: 1.0,
            spoke_offset: FRAC_PI_8,
            close_ring: true,
            log_filter: "info".to_owned(),
        }
    }
}

/// Error returned when the demonstration configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for [`DemoConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The ring has no anchors to build on.
    #[error("ring_size must be at least 1")]
    EmptyRing,
}

impl DemoConfig {
    /// Read a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.ring_size == 0 {
            return Err(ConfigError::EmptyRing);
        }
        Ok(config)
    }
}
