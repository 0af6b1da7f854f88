//! RadonLab Core: room series, statistic formulas, campaigns, input ingestion.
//!
//! This crate contains the per-campaign half of the 6+1 protocol simulator:
//! - `RoomSeries`: one room's hourly concentrations plus descriptive statistics
//! - `stats`: pure formulas (quantile index policy, GM, CV, QD, GSD, factorial)
//! - `Campaign`: seven day slots assembled into a 168-hour chain with separate
//!   room and cellar statistics
//! - `CampaignType`: how many distinct rooms share the six room days
//! - `data`: CSV ingestion, role-partitioned room pools, synthetic series

pub mod data;
pub mod domain;
pub mod error;
pub mod rng;
pub mod stats;

pub use domain::{
    Campaign, CampaignRecord, CampaignType, Role, RoomSeries, SlotKind, SubsetStatistics,
    VariationPattern,
};
pub use error::CoreError;
