//! RoomSeries: one physical room's hourly radon concentrations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Role of a measured location within the 6+1 protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Room,
    Cellar,
    Misc,
}

impl Role {
    /// Derive the role from an identifier's first character.
    ///
    /// `R`/`r` selects Room, `C`/`c` selects Cellar, anything else is Misc.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('R') => Role::Room,
            Some('C') => Role::Cellar,
            _ => Role::Misc,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Room => write!(f, "room"),
            Role::Cellar => write!(f, "cellar"),
            Role::Misc => write!(f, "misc"),
        }
    }
}

/// Hourly concentration series (Bq/m³) for a single room, with descriptive statistics.
///
/// Immutable once built: statistics are computed in one pass at construction.
/// Equality considers identifier and role only, never the values.
///
/// Serialized as identifier, role and values; statistics are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RoomSeriesData", into = "RoomSeriesData")]
pub struct RoomSeries {
    identifier: String,
    role: Role,
    values: Vec<f64>,
    mean: f64,
    maximum: f64,
    deviation: f64,
}

/// Stored form of a `RoomSeries`.
#[derive(Serialize, Deserialize)]
struct RoomSeriesData {
    identifier: String,
    role: Role,
    values: Vec<f64>,
}

impl TryFrom<RoomSeriesData> for RoomSeries {
    type Error = CoreError;

    fn try_from(data: RoomSeriesData) -> Result<Self, Self::Error> {
        RoomSeries::with_role(data.identifier, data.role, data.values)
    }
}

impl From<RoomSeries> for RoomSeriesData {
    fn from(series: RoomSeries) -> Self {
        Self {
            identifier: series.identifier,
            role: series.role,
            values: series.values,
        }
    }
}

impl RoomSeries {
    /// Build a series, deriving its role from the identifier.
    pub fn new(identifier: impl Into<String>, values: Vec<f64>) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        let role = Role::from_identifier(&identifier);
        Self::with_role(identifier, role, values)
    }

    /// Build a series with an explicitly assigned role.
    ///
    /// Ingestion applies the identifier rule once and passes the tag through here.
    pub fn with_role(
        identifier: impl Into<String>,
        role: Role,
        values: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        if values.is_empty() {
            return Err(CoreError::invalid(format!(
                "series '{identifier}' has no values"
            )));
        }

        // Welford single pass: count, mean, M2, max.
        let mut count = 0.0;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut maximum = f64::NEG_INFINITY;
        for &v in &values {
            count += 1.0;
            let delta = v - mean;
            mean += delta / count;
            m2 += delta * (v - mean);
            if v > maximum {
                maximum = v;
            }
        }
        let deviation = (m2 / count).max(0.0).sqrt();

        Ok(Self {
            identifier,
            role,
            values,
            mean,
            maximum,
            deviation,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Population standard deviation (denominator = count).
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// A new series with the same identifier and role but different values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, CoreError> {
        Self::with_role(self.identifier.clone(), self.role, values)
    }

    /// The 24-hour window starting at `offset`, if the series is long enough.
    pub fn window(&self, offset: usize, len: usize) -> Option<&[f64]> {
        self.values.get(offset..offset.checked_add(len)?)
    }
}

impl PartialEq for RoomSeries {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.role == other.role
    }
}

impl Eq for RoomSeries {}

impl std::hash::Hash for RoomSeries {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
        self.role.hash(state);
    }
}
