//! RadonLab Runner: campaign sweeps, population distributions, export.
//!
//! This crate builds on `radonlab-core` to provide:
//! - Arrangement enumeration for each campaign type
//! - The simulation engine (parallel batches, cancellation, progress)
//! - Population distributions with exact quantile access
//! - Serializable configuration, results, and archives
//! - JSON/CSV/Markdown export

pub mod arrangement;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod reporting;
pub mod result;

pub use arrangement::{expected_campaign_count, room_sequences, Arrangement, RoomSequence};
pub use config::{ConfigError, OutputMode, SimulationConfig, StartRange};
pub use distribution::{
    Distribution, DistributionBuilder, PopulationAccumulator, PopulationDistributions,
    StatisticKind,
};
pub use engine::{SimulationEngine, SimulationError, SimulationProgress, SweepPlan};
pub use result::{SimulationArchive, SimulationResult, SCHEMA_VERSION};
