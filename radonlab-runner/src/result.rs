//! Simulation results and their persisted form.

use radonlab_core::{Campaign, CampaignRecord, CampaignType};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::distribution::{Distribution, PopulationDistributions, StatisticKind};

/// Current archive schema version. Archives with a higher version are rejected.
pub const SCHEMA_VERSION: u32 = 1;

/// Outcome of a completed sweep.
///
/// Only produced when the whole sweep finished; cancelled or failed runs
/// return an error instead.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub config: SimulationConfig,
    pub campaign_type: CampaignType,
    /// BLAKE3 fingerprint of the room pool.
    pub dataset_hash: String,
    pub room_ids: Vec<String>,
    pub cellar_ids: Vec<String>,
    pub offsets: Vec<usize>,
    pub population: u64,
    pub distributions: PopulationDistributions,
    /// Every campaign, in arrangement then start order (materialize mode only).
    pub campaigns: Option<Vec<Campaign>>,
    pub elapsed_secs: f64,
}

impl SimulationResult {
    pub fn distribution(&self, kind: StatisticKind) -> &Distribution {
        self.distributions.get(kind)
    }

    pub fn campaigns(&self) -> Option<&[Campaign]> {
        self.campaigns.as_deref()
    }

    /// Owned snapshots of every campaign (empty in streaming mode).
    pub fn records(&self) -> Vec<CampaignRecord> {
        self.campaigns()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, c)| c.to_record(i as u64))
            .collect()
    }

    pub fn archive(&self) -> SimulationArchive {
        SimulationArchive {
            schema_version: SCHEMA_VERSION,
            config: self.config.clone(),
            campaign_type: self.campaign_type,
            dataset_hash: self.dataset_hash.clone(),
            room_ids: self.room_ids.clone(),
            cellar_ids: self.cellar_ids.clone(),
            offsets: self.offsets.clone(),
            population: self.population,
            distributions: self.distributions.clone(),
            campaigns: self.records(),
            elapsed_secs: self.elapsed_secs,
        }
    }
}

/// Serializable form of a `SimulationResult` for the object store and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationArchive {
    pub schema_version: u32,
    pub config: SimulationConfig,
    pub campaign_type: CampaignType,
    pub dataset_hash: String,
    pub room_ids: Vec<String>,
    pub cellar_ids: Vec<String>,
    pub offsets: Vec<usize>,
    pub population: u64,
    pub distributions: PopulationDistributions,
    pub campaigns: Vec<CampaignRecord>,
    pub elapsed_secs: f64,
}
