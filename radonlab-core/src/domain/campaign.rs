//! Campaign: one synthetic seven-day 6+1 measurement built from real room series.
//!
//! A campaign takes seven room series (one per day slot), a start offset, and a
//! variation pattern marking the cellar day. Slot `i` contributes the 24 hourly
//! values starting at `start + 24 * i` of its series, so the campaign behaves
//! like a real visit that moves to the next room each day.
//!
//! Statistics are computed once at construction for the 144 room-hours and the
//! 24 cellar-hours separately. "Changing" a campaign means building a new one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::room_series::{Role, RoomSeries};
use crate::error::CoreError;
use crate::stats;

/// Days in a campaign.
pub const DAYS: usize = 7;
/// Hours contributed by each day slot.
pub const HOURS_PER_DAY: usize = 24;
/// Length of the full value chain.
pub const CAMPAIGN_HOURS: usize = DAYS * HOURS_PER_DAY;
/// Room-hours in a campaign (six room days).
pub const ROOM_HOURS: usize = (DAYS - 1) * HOURS_PER_DAY;
/// Cellar-hours in a campaign (one cellar day).
pub const CELLAR_HOURS: usize = HOURS_PER_DAY;

/// Kind of a single day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Room,
    Cellar,
}

/// Per-slot room/cellar marking for the seven days of a campaign.
///
/// The pattern is a plain carrier; `Campaign::new` validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationPattern {
    slots: Vec<SlotKind>,
}

impl VariationPattern {
    pub fn from_slots(slots: Vec<SlotKind>) -> Self {
        Self { slots }
    }

    /// Seven slots with the cellar day at `slot` (0-based).
    pub fn cellar_at(slot: usize) -> Self {
        let slots = (0..DAYS)
            .map(|i| if i == slot { SlotKind::Cellar } else { SlotKind::Room })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[SlotKind] {
        &self.slots
    }

    /// Position of the cellar slot when exactly one slot is marked Cellar.
    pub fn cellar_slot(&self) -> Option<usize> {
        let mut cellars = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == SlotKind::Cellar)
            .map(|(i, _)| i);
        match (cellars.next(), cellars.next()) {
            (Some(i), None) => Some(i),
            _ => None,
        }
    }

    /// Compact code such as `RRRCRRR`.
    pub fn code(&self) -> String {
        self.slots
            .iter()
            .map(|k| match k {
                SlotKind::Room => 'R',
                SlotKind::Cellar => 'C',
            })
            .collect()
    }
}

/// Descriptive statistics over one hour subset of a campaign (rooms or cellar).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsetStatistics {
    pub mean: f64,
    pub geometric_mean: f64,
    pub median: f64,
    pub maxima: f64,
    pub minima: f64,
    pub deviation: f64,
    pub coefficient_of_variation: f64,
    pub range: f64,
    pub q05: f64,
    pub q95: f64,
    pub quantile_deviation: f64,
    /// Geometric standard deviation from the shared formula helper.
    pub geometric_deviation: f64,
    /// Historic per-campaign log deviation.
    ///
    /// Takes the log of already log-transformed values divided by the geometric
    /// mean, which does not match the standard definition. Reported for
    /// comparison with earlier evaluations only; use `geometric_deviation`.
    pub legacy_log_deviation: f64,
}

impl SubsetStatistics {
    /// Compute all statistics for a subset. Values need not be sorted.
    pub fn compute(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        stats::sort_ascending(&mut sorted);

        let mean = stats::mean(&sorted);
        let geometric_mean = stats::geometric_mean(&sorted);
        let deviation = stats::population_deviation(&sorted, mean);
        let median = stats::median_sorted(&sorted);
        let q05 = stats::quantile_sorted(&sorted, 5.0);
        let q95 = stats::quantile_sorted(&sorted, 95.0);
        let minima = sorted.first().copied().unwrap_or(0.0);
        let maxima = sorted.last().copied().unwrap_or(0.0);

        Self {
            mean,
            geometric_mean,
            median,
            maxima,
            minima,
            deviation,
            coefficient_of_variation: stats::calculate_cv(mean, deviation),
            range: maxima - minima,
            q05,
            q95,
            quantile_deviation: stats::calculate_qd(q05, median, q95),
            geometric_deviation: stats::calculate_gsd(&sorted, geometric_mean),
            legacy_log_deviation: legacy_log_deviation(&sorted, geometric_mean),
        }
    }
}

fn legacy_log_deviation(values: &[f64], geometric_mean: f64) -> f64 {
    if values.is_empty() || geometric_mean == 0.0 {
        return 1.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|&v| stats::log_or_zero(stats::log_or_zero(v) / geometric_mean).powi(2))
        .sum();
    (sum_sq / values.len() as f64).sqrt().exp()
}

/// A synthetic seven-day campaign.
///
/// Holds shared references to its room series; never mutates them.
#[derive(Debug, Clone)]
pub struct Campaign {
    start: usize,
    rooms: Vec<Arc<RoomSeries>>,
    cellar_slot: usize,
    room_stats: SubsetStatistics,
    cellar_stats: SubsetStatistics,
}

impl Campaign {
    /// Build a campaign and compute its statistics.
    ///
    /// Fails with `InvalidInput` when `rooms` is not exactly seven entries, when
    /// the pattern does not mark exactly one cellar slot, or when slot roles do
    /// not match the pattern. Fails with `Range` when any series is shorter than
    /// `start + 168`.
    pub fn new(
        start: usize,
        rooms: Vec<Arc<RoomSeries>>,
        pattern: &VariationPattern,
    ) -> Result<Self, CoreError> {
        if rooms.len() != DAYS {
            return Err(CoreError::invalid(format!(
                "campaign needs {DAYS} rooms, got {}",
                rooms.len()
            )));
        }
        if pattern.slots().len() != DAYS {
            return Err(CoreError::invalid(format!(
                "variation pattern needs {DAYS} slots, got {}",
                pattern.slots().len()
            )));
        }
        let cellar_slot = pattern.cellar_slot().ok_or_else(|| {
            CoreError::invalid(format!(
                "variation pattern '{}' must mark exactly one cellar slot",
                pattern.code()
            ))
        })?;

        for (slot, room) in rooms.iter().enumerate() {
            let expected = if slot == cellar_slot {
                Role::Cellar
            } else {
                Role::Room
            };
            if room.role() != expected {
                return Err(CoreError::invalid(format!(
                    "slot {slot} expects a {expected} series, '{}' is {}",
                    room.identifier(),
                    room.role()
                )));
            }
        }

        let required = start.checked_add(CAMPAIGN_HOURS).ok_or(CoreError::Range {
            identifier: rooms[0].identifier().to_string(),
            start,
            required: usize::MAX,
            available: rooms[0].count(),
        })?;
        if let Some(short) = rooms.iter().find(|r| r.count() < required) {
            return Err(CoreError::Range {
                identifier: short.identifier().to_string(),
                start,
                required,
                available: short.count(),
            });
        }

        let mut room_values = Vec::with_capacity(ROOM_HOURS);
        let mut cellar_values: &[f64] = &[];
        for (slot, room) in rooms.iter().enumerate() {
            let offset = start + HOURS_PER_DAY * slot;
            let day = &room.values()[offset..offset + HOURS_PER_DAY];
            if slot == cellar_slot {
                cellar_values = day;
            } else {
                room_values.extend_from_slice(day);
            }
        }

        let room_stats = SubsetStatistics::compute(&room_values);
        let cellar_stats = SubsetStatistics::compute(cellar_values);

        Ok(Self {
            start,
            rooms,
            cellar_slot,
            room_stats,
            cellar_stats,
        })
    }

    /// Same rooms and pattern at another start offset.
    pub fn with_start(&self, start: usize) -> Result<Self, CoreError> {
        Self::new(start, self.rooms.clone(), &self.pattern())
    }

    /// Same start offset with a different room assignment.
    pub fn with_rooms(
        &self,
        rooms: Vec<Arc<RoomSeries>>,
        pattern: &VariationPattern,
    ) -> Result<Self, CoreError> {
        Self::new(self.start, rooms, pattern)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn rooms(&self) -> &[Arc<RoomSeries>] {
        &self.rooms
    }

    pub fn cellar_slot(&self) -> usize {
        self.cellar_slot
    }

    pub fn pattern(&self) -> VariationPattern {
        VariationPattern::cellar_at(self.cellar_slot)
    }

    /// Slot identifiers joined by `-`, e.g. `R1-R2-C1-R3-R4-R5-R6`.
    pub fn variation_tag(&self) -> String {
        self.rooms
            .iter()
            .map(|r| r.identifier())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn room_statistics(&self) -> &SubsetStatistics {
        &self.room_stats
    }

    pub fn cellar_statistics(&self) -> &SubsetStatistics {
        &self.cellar_stats
    }

    /// The full 168-value chain in slot order.
    pub fn values(&self) -> Vec<f64> {
        let mut chain = Vec::with_capacity(CAMPAIGN_HOURS);
        for slot in 0..DAYS {
            chain.extend_from_slice(self.day(slot));
        }
        chain
    }

    /// The 144 room-hour values in slot order.
    pub fn room_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(ROOM_HOURS);
        for slot in (0..DAYS).filter(|&s| s != self.cellar_slot) {
            values.extend_from_slice(self.day(slot));
        }
        values
    }

    /// The 24 cellar-hour values.
    pub fn cellar_values(&self) -> Vec<f64> {
        self.day(self.cellar_slot).to_vec()
    }

    // Bounds were checked in `new`.
    fn day(&self, slot: usize) -> &[f64] {
        let offset = self.start + HOURS_PER_DAY * slot;
        &self.rooms[slot].values()[offset..offset + HOURS_PER_DAY]
    }

    /// Owned snapshot for persistence and export.
    pub fn to_record(&self, index: u64) -> CampaignRecord {
        CampaignRecord {
            index,
            start: self.start,
            variation: self.variation_tag(),
            room_ids: self
                .rooms
                .iter()
                .map(|r| r.identifier().to_string())
                .collect(),
            cellar_slot: self.cellar_slot,
            room: self.room_stats,
            cellar: self.cellar_stats,
            values: self.values(),
        }
    }
}

/// Serializable snapshot of a campaign: every field collaborators read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub index: u64,
    pub start: usize,
    pub variation: String,
    pub room_ids: Vec<String>,
    pub cellar_slot: usize,
    pub room: SubsetStatistics,
    pub cellar: SubsetStatistics,
    pub values: Vec<f64>,
}
