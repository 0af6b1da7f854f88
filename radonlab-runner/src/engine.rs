//! Simulation engine: the exhaustive campaign sweep.
//!
//! For a campaign type and a room pool, every arrangement (room sequence ×
//! cellar candidate × cellar slot) is combined with every valid start offset.
//! Each combination becomes one `Campaign`, and its room/cellar statistics
//! are folded into eight population distributions.
//!
//! Room sequences are processed in batches. Within a batch, sequences run in
//! parallel on rayon; each produces a local accumulator (and, in materialize
//! mode, its campaigns), collected in sequence order and merged. Cancellation
//! is checked between batches. A run is all-or-nothing: cancellation or any
//! construction error discards everything built so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use radonlab_core::data::RoomPool;
use radonlab_core::domain::CAMPAIGN_HOURS;
use radonlab_core::{Campaign, CoreError};

use crate::arrangement::{expected_campaign_count, room_sequences, Arrangement, RoomSequence};
use crate::config::{ConfigError, OutputMode, SimulationConfig};
use crate::distribution::PopulationAccumulator;
use crate::result::SimulationResult;

/// Errors from a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Campaign construction failed mid-sweep. Offsets are validated up front,
    /// so this indicates an enumeration bug rather than bad input.
    #[error("campaign construction failed: {0}")]
    Core(#[from] CoreError),

    #[error("simulation cancelled")]
    Cancelled,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("generated {actual} campaigns, expected {expected}")]
    PopulationMismatch { expected: u128, actual: u64 },
}

/// Progress update sent after each completed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationProgress {
    pub campaigns_done: u64,
    pub campaigns_total: u64,
    pub batches_done: usize,
    pub batches_total: usize,
    pub elapsed_secs: f64,
}

impl SimulationProgress {
    pub fn percent(&self) -> f64 {
        if self.campaigns_total == 0 {
            return 100.0;
        }
        self.campaigns_done as f64 / self.campaigns_total as f64 * 100.0
    }
}

/// Resolved sweep: room sequences, start offsets, and closed-form population size.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub sequences: Vec<RoomSequence>,
    pub offsets: Vec<usize>,
    pub expected: u128,
}

/// Per-batch (or per-sequence) output.
#[derive(Debug, Default)]
struct Partial {
    acc: PopulationAccumulator,
    campaigns: Vec<Campaign>,
}

impl Partial {
    fn merge(mut self, other: Partial) -> Self {
        self.acc = self.acc.merge(other.acc);
        self.campaigns.extend(other.campaigns);
        self
    }
}

/// Drives the campaign sweep for one configuration.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Check preconditions and resolve the sweep without building campaigns.
    pub fn plan(&self, pool: &RoomPool) -> Result<SweepPlan, ConfigError> {
        let campaign_type = self.config.campaign_type;
        let required = campaign_type.slot_count();
        if pool.rooms().len() < required {
            return Err(ConfigError::InsufficientRooms {
                campaign_type,
                required,
                available: pool.rooms().len(),
            });
        }
        if pool.cellars().is_empty() {
            return Err(ConfigError::NoCellar);
        }

        // Pool construction guarantees every series holds at least one campaign.
        let latest = pool.shortest_len().saturating_sub(CAMPAIGN_HOURS);
        let offsets = self.config.start.resolve(latest);
        if offsets.is_empty() {
            return Err(ConfigError::NoStartOffsets {
                first: self.config.start.first,
                last: self.config.start.last.unwrap_or(latest),
                step: self.config.start.step,
                latest,
            });
        }

        let sequences = room_sequences(pool.rooms().len(), required);
        let expected = expected_campaign_count(
            campaign_type,
            pool.rooms().len(),
            pool.cellars().len(),
            offsets.len(),
        );

        Ok(SweepPlan {
            sequences,
            offsets,
            expected,
        })
    }

    /// Run the full sweep.
    ///
    /// `progress` is called after every batch; `cancel` is polled before every
    /// batch. A cancelled run returns `SimulationError::Cancelled`.
    pub fn run(
        &self,
        pool: &RoomPool,
        progress: Option<&(dyn Fn(&SimulationProgress) + Sync)>,
        cancel: Option<&AtomicBool>,
    ) -> Result<SimulationResult, SimulationError> {
        let span = info_span!("simulation", campaign_type = %self.config.campaign_type);
        let _enter = span.enter();

        let start_time = Instant::now();
        let plan = self.plan(pool)?;
        let materialize = self.config.mode == OutputMode::Materialize;
        if materialize && plan.expected > u128::from(self.config.max_materialized) {
            return Err(ConfigError::TooManyCampaigns {
                expected: plan.expected,
                limit: self.config.max_materialized,
            }
            .into());
        }

        info!(
            rooms = pool.rooms().len(),
            cellars = pool.cellars().len(),
            sequences = plan.sequences.len(),
            offsets = plan.offsets.len(),
            expected = %plan.expected,
            mode = ?self.config.mode,
            "sweep planned"
        );

        let thread_pool = match (self.config.parallel, self.config.threads) {
            (true, Some(n)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimulationError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        let sweep = || self.sweep(pool, &plan, materialize, progress, cancel, start_time);
        let total = match &thread_pool {
            Some(tp) => {
                // The installed closure runs on a pool worker: carry over the
                // caller's (possibly scoped) dispatcher and the run span.
                let dispatch = tracing::dispatcher::get_default(|d| d.clone());
                tp.install(|| {
                    tracing::dispatcher::with_default(&dispatch, || span.in_scope(sweep))
                })?
            }
            None => sweep()?,
        };

        let population = total.acc.count();
        if u128::from(population) != plan.expected {
            return Err(SimulationError::PopulationMismatch {
                expected: plan.expected,
                actual: population,
            });
        }

        let distributions = total.acc.finish();
        let elapsed_secs = start_time.elapsed().as_secs_f64();
        info!(population, elapsed_secs, "sweep complete");

        Ok(SimulationResult {
            config: self.config.clone(),
            campaign_type: self.config.campaign_type,
            dataset_hash: pool.fingerprint(),
            room_ids: pool.rooms().iter().map(|r| r.identifier().to_string()).collect(),
            cellar_ids: pool
                .cellars()
                .iter()
                .map(|c| c.identifier().to_string())
                .collect(),
            offsets: plan.offsets,
            population,
            distributions,
            campaigns: materialize.then_some(total.campaigns),
            elapsed_secs,
        })
    }

    fn sweep(
        &self,
        pool: &RoomPool,
        plan: &SweepPlan,
        materialize: bool,
        progress: Option<&(dyn Fn(&SimulationProgress) + Sync)>,
        cancel: Option<&AtomicBool>,
        start_time: Instant,
    ) -> Result<Partial, SimulationError> {
        let batches_total = plan.sequences.len().div_ceil(self.config.batch_size);
        let campaigns_total = u64::try_from(plan.expected).unwrap_or(u64::MAX);
        let mut total = Partial::default();

        for (batch_idx, batch) in plan.sequences.chunks(self.config.batch_size).enumerate() {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                warn!(
                    batches_done = batch_idx,
                    batches_total, "sweep cancelled, discarding partial results"
                );
                return Err(SimulationError::Cancelled);
            }

            let partials: Vec<Partial> = if self.config.parallel {
                batch
                    .par_iter()
                    .map(|seq| expand_sequence(*seq, pool, &plan.offsets, materialize))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                batch
                    .iter()
                    .map(|seq| expand_sequence(*seq, pool, &plan.offsets, materialize))
                    .collect::<Result<Vec<_>, _>>()?
            };
            total = partials.into_iter().fold(total, Partial::merge);

            debug!(
                batch = batch_idx + 1,
                batches_total,
                campaigns = total.acc.count(),
                "batch complete"
            );
            if let Some(cb) = progress {
                cb(&SimulationProgress {
                    campaigns_done: total.acc.count(),
                    campaigns_total,
                    batches_done: batch_idx + 1,
                    batches_total,
                    elapsed_secs: start_time.elapsed().as_secs_f64(),
                });
            }
        }

        Ok(total)
    }
}

/// All campaigns for one room sequence: every cellar, every slot, every offset.
fn expand_sequence(
    rooms: RoomSequence,
    pool: &RoomPool,
    offsets: &[usize],
    materialize: bool,
) -> Result<Partial, CoreError> {
    let mut partial = Partial::default();
    for arrangement in Arrangement::expand(rooms, pool.cellars().len()) {
        let series = arrangement.series(pool.rooms(), pool.cellars());
        let pattern = arrangement.pattern();
        for &start in offsets {
            let campaign = Campaign::new(start, series.clone(), &pattern)?;
            partial.acc.push(&campaign);
            if materialize {
                partial.campaigns.push(campaign);
            }
        }
    }
    partial.acc.seal();
    Ok(partial)
}
