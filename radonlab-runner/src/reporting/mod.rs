//! Reporting and artifact export.

pub mod export;
pub mod report;

pub use export::{
    export_campaigns_csv, export_chain_csv, export_json, export_summary_csv, import_json,
    load_archive, save_artifacts,
};
pub use report::{generate_report, REFERENCE_LEVEL};
