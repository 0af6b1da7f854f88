//! Input ingestion: hourly CSV tables, validated room pools, synthetic series.

pub mod pool;
pub mod synthetic;
pub mod table;

pub use pool::RoomPool;
pub use synthetic::{generate_pool, generate_room_series};
pub use table::HourlyTable;

use thiserror::Error;

use crate::error::CoreError;

/// Errors from reading and validating input series.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table has no room columns")]
    NoColumns,

    #[error("column {column} has an empty identifier")]
    EmptyIdentifier { column: usize },

    #[error("identifier '{0}' appears more than once")]
    DuplicateIdentifier(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column '{column}': cannot read '{raw}' as a concentration")]
    BadValue {
        line: usize,
        column: String,
        raw: String,
    },

    #[error("series '{identifier}' has {len} hourly values, at least {required} needed")]
    TooShort {
        identifier: String,
        len: usize,
        required: usize,
    },

    #[error(transparent)]
    Series(#[from] CoreError),
}
