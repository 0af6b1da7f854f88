//! Serializable simulation configuration.

use std::path::Path;

use radonlab_core::CampaignType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for sweep parameters that cannot produce a valid run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("campaign type {campaign_type} needs {required} room candidates, got {available}")]
    InsufficientRooms {
        campaign_type: CampaignType,
        required: usize,
        available: usize,
    },

    #[error("no cellar candidate supplied")]
    NoCellar,

    #[error(
        "no start offset in {first}..={last} (step {step}) fits the shortest series (latest valid start {latest})"
    )]
    NoStartOffsets {
        first: usize,
        last: usize,
        step: usize,
        latest: usize,
    },

    #[error("{expected} campaigns exceed the materialization limit of {limit}; use streaming mode")]
    TooManyCampaigns { expected: u128, limit: u64 },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Whether the engine keeps every campaign or only the population distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Keep every campaign for drill-down and charting.
    Materialize,
    /// Keep only the eight population distributions.
    Streaming,
}

/// Requested start offsets (hour index into every series).
///
/// `last = None` means "latest start the shortest series allows".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartRange {
    pub first: usize,
    pub last: Option<usize>,
    pub step: usize,
}

impl Default for StartRange {
    fn default() -> Self {
        Self {
            first: 0,
            last: None,
            step: 1,
        }
    }
}

impl StartRange {
    /// A single start offset.
    pub fn single(start: usize) -> Self {
        Self {
            first: start,
            last: Some(start),
            step: 1,
        }
    }

    /// Offsets in the range that do not exceed `latest`.
    ///
    /// Offsets past `latest` would overrun a series; they are dropped here
    /// instead of failing campaign construction later.
    pub fn resolve(&self, latest: usize) -> Vec<usize> {
        let last = self.last.unwrap_or(latest).min(latest);
        if self.step == 0 || self.first > last {
            return Vec::new();
        }
        (self.first..=last).step_by(self.step).collect()
    }
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub campaign_type: CampaignType,
    pub start: StartRange,
    pub mode: OutputMode,
    /// Run arrangement batches on the rayon pool.
    pub parallel: bool,
    /// Dedicated pool size; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Room sequences per batch. Cancellation is checked between batches.
    pub batch_size: usize,
    /// Upper bound on campaigns kept in materialize mode.
    pub max_materialized: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            campaign_type: CampaignType::Six,
            start: StartRange::default(),
            mode: OutputMode::Materialize,
            parallel: true,
            threads: None,
            batch_size: 64,
            max_materialized: 2_000_000,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start.step == 0 {
            return Err(ConfigError::Invalid("start.step must be at least 1".into()));
        }
        if let Some(last) = self.start.last {
            if last < self.start.first {
                return Err(ConfigError::Invalid(format!(
                    "start.last ({last}) is before start.first ({})",
                    self.start.first
                )));
            }
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        Ok(())
    }
}
