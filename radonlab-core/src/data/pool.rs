//! Room pool: validated candidate series partitioned by role.
//!
//! Ingestion applies the identifier role rule exactly once, here. Everything
//! downstream works with the resulting `Role` tags.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Role, RoomSeries, CAMPAIGN_HOURS};

use super::{HourlyTable, IngestError};

/// Candidate series for a simulation run.
///
/// Room and cellar candidates are sorted by identifier so that arrangement
/// enumeration is deterministic regardless of input order.
#[derive(Debug, Clone)]
pub struct RoomPool {
    rooms: Vec<Arc<RoomSeries>>,
    cellars: Vec<Arc<RoomSeries>>,
    excluded: Vec<String>,
}

impl RoomPool {
    /// Build a pool from already-constructed series.
    ///
    /// Duplicates (same identifier and role) keep the first occurrence. Misc
    /// series are excluded. Every kept series must hold at least one full
    /// campaign (168 values).
    pub fn new(series: impl IntoIterator<Item = RoomSeries>) -> Result<Self, IngestError> {
        let mut seen: HashSet<(String, Role)> = HashSet::new();
        let mut rooms = Vec::new();
        let mut cellars = Vec::new();
        let mut excluded = Vec::new();

        for s in series {
            if !seen.insert((s.identifier().to_string(), s.role())) {
                warn!(identifier = s.identifier(), "duplicate series dropped");
                continue;
            }
            match s.role() {
                Role::Misc => {
                    warn!(
                        identifier = s.identifier(),
                        "series is neither room nor cellar, excluded"
                    );
                    excluded.push(s.identifier().to_string());
                    continue;
                }
                Role::Room | Role::Cellar => {}
            }
            if s.count() < CAMPAIGN_HOURS {
                return Err(IngestError::TooShort {
                    identifier: s.identifier().to_string(),
                    len: s.count(),
                    required: CAMPAIGN_HOURS,
                });
            }
            match s.role() {
                Role::Room => rooms.push(Arc::new(s)),
                Role::Cellar => cellars.push(Arc::new(s)),
                Role::Misc => {}
            }
        }

        rooms.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        cellars.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        debug!(
            rooms = rooms.len(),
            cellars = cellars.len(),
            excluded = excluded.len(),
            "room pool built"
        );

        Ok(Self {
            rooms,
            cellars,
            excluded,
        })
    }

    /// Build a pool from an identifier → hourly values mapping.
    pub fn from_series<I, S>(series: I) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let built = series
            .into_iter()
            .map(|(id, values)| RoomSeries::new(id, values))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(built)
    }

    pub fn from_table(table: HourlyTable) -> Result<Self, IngestError> {
        Self::from_series(table.into_map())
    }

    pub fn rooms(&self) -> &[Arc<RoomSeries>] {
        &self.rooms
    }

    pub fn cellars(&self) -> &[Arc<RoomSeries>] {
        &self.cellars
    }

    /// Identifiers dropped because their role is Misc.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Length of the shortest candidate series (room or cellar), or 0 if empty.
    pub fn shortest_len(&self) -> usize {
        self.rooms
            .iter()
            .chain(&self.cellars)
            .map(|s| s.count())
            .min()
            .unwrap_or(0)
    }

    /// BLAKE3 over identifiers, roles, and values of every candidate.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for s in self.rooms.iter().chain(&self.cellars) {
            hasher.update(s.identifier().as_bytes());
            hasher.update(&[s.role() as u8]);
            hasher.update(&(s.count() as u64).to_le_bytes());
            for v in s.values() {
                hasher.update(&v.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}
