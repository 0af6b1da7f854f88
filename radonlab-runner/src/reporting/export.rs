//! JSON and CSV export of simulation results.
//!
//! - **JSON**: `SimulationArchive` round-trip with schema versioning
//! - **CSV**: one row per campaign, a per-statistic summary, and a single
//!   campaign's 168-hour chain for charting
//!
//! Archives carry a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use radonlab_core::domain::HOURS_PER_DAY;
use radonlab_core::{Campaign, CampaignRecord};

use crate::distribution::{PopulationDistributions, StatisticKind};
use crate::result::{SimulationArchive, SimulationResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a result's archive to pretty JSON.
pub fn export_json(result: &SimulationResult) -> Result<String> {
    serde_json::to_string_pretty(&result.archive())
        .context("failed to serialize SimulationArchive to JSON")
}

/// Deserialize a `SimulationArchive`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SimulationArchive> {
    let archive: SimulationArchive =
        serde_json::from_str(json).context("failed to deserialize SimulationArchive from JSON")?;
    if archive.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            archive.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(archive)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per campaign, statistics truncated to integer Bq/m³.
///
/// Columns: index, variation, start, room_am, room_gm, room_median, room_max,
/// cellar_am, cellar_gm, cellar_median, cellar_max
pub fn export_campaigns_csv(records: &[CampaignRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["index", "variation", "start"];
    header.extend(StatisticKind::ALL.iter().map(|k| k.label()));
    wtr.write_record(&header)?;

    for r in records {
        let mut row = vec![r.index.to_string(), r.variation.clone(), r.start.to_string()];
        row.extend(
            StatisticKind::ALL
                .iter()
                .map(|k| truncate(k.extract(&r.room, &r.cellar)).to_string()),
        );
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per statistic kind: count, mean, min, q05, median, q95, max.
pub fn export_summary_csv(distributions: &PopulationDistributions) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["statistic", "count", "mean", "min", "q05", "median", "q95", "max"])?;
    for (kind, d) in distributions.iter() {
        wtr.write_record([
            kind.label().to_string(),
            d.len().to_string(),
            format!("{:.2}", d.mean()),
            format!("{:.2}", d.min()),
            format!("{:.2}", d.quantile(5.0)),
            format!("{:.2}", d.median()),
            format!("{:.2}", d.quantile(95.0)),
            format!("{:.2}", d.max()),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// The 168-hour chain of one campaign with the slot and series behind each hour.
pub fn export_chain_csv(campaign: &Campaign) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["hour", "slot", "identifier", "value"])?;
    for (hour, value) in campaign.values().iter().enumerate() {
        let slot = hour / HOURS_PER_DAY;
        let identifier = campaign
            .rooms()
            .get(slot)
            .map(|r| r.identifier())
            .unwrap_or_default();
        wtr.write_record([
            hour.to_string(),
            slot.to_string(),
            identifier.to_string(),
            format!("{value:.3}"),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one simulation run.
///
/// Creates `{type}_{timestamp}/` under `output_dir` containing:
/// - `archive.json`: the full `SimulationArchive`
/// - `campaigns.csv`: one row per campaign (header only in streaming mode)
/// - `summary.csv`: distribution summary
/// - `report.md`: human-readable summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &SimulationResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        result.campaign_type.name(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let archive = result.archive();
    let json = serde_json::to_string_pretty(&archive)
        .context("failed to serialize SimulationArchive to JSON")?;
    std::fs::write(run_dir.join("archive.json"), &json)?;

    let campaigns_csv = export_campaigns_csv(&archive.campaigns)?;
    std::fs::write(run_dir.join("campaigns.csv"), &campaigns_csv)?;

    let summary_csv = export_summary_csv(&archive.distributions)?;
    std::fs::write(run_dir.join("summary.csv"), &summary_csv)?;

    std::fs::write(
        run_dir.join("report.md"),
        super::report::generate_report(&archive),
    )?;

    Ok(run_dir)
}

/// Load a `SimulationArchive` from a file, or from an artifact directory's
/// `archive.json`.
pub fn load_archive(path: &Path) -> Result<SimulationArchive> {
    let file = if path.is_dir() {
        path.join("archive.json")
    } else {
        path.to_path_buf()
    };
    let json = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputMode, SimulationConfig, StartRange};
    use crate::engine::SimulationEngine;
    use radonlab_core::data::RoomPool;
    use radonlab_core::CampaignType;

    fn small_result(mode: OutputMode) -> SimulationResult {
        let pool = RoomPool::from_series(vec![
            ("R1", (0..170).map(|h| 100.0 + h as f64).collect::<Vec<_>>()),
            ("R2", vec![250.9; 170]),
            ("C1", vec![900.5; 170]),
        ])
        .unwrap();
        let config = SimulationConfig {
            campaign_type: CampaignType::One,
            start: StartRange::single(1),
            mode,
            ..SimulationConfig::default()
        };
        SimulationEngine::new(config)
            .unwrap()
            .run(&pool, None, None)
            .unwrap()
    }

    #[test]
    fn json_roundtrip_is_lossless() {
        let result = small_result(OutputMode::Materialize);
        let json = export_json(&result).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back, result.archive());
        assert_eq!(back.campaigns.len(), 14);
        assert_eq!(back.campaigns[0].values.len(), 168);
    }

    #[test]
    fn newer_schema_rejected() {
        let result = small_result(OutputMode::Streaming);
        let mut archive = result.archive();
        archive.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&archive).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn campaigns_csv_truncates() {
        let result = small_result(OutputMode::Materialize);
        let csv = export_campaigns_csv(&result.records()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "index,variation,start,room_am,room_gm,room_median,room_max,cellar_am,cellar_gm,cellar_median,cellar_max"
        );
        assert_eq!(csv.lines().count(), 15);
        // R2 repeated six times with C1 in the last slot (second sequence, slot 6).
        let row = csv
            .lines()
            .find(|l| l.contains(",R2-R2-R2-R2-R2-R2-C1,"))
            .unwrap();
        assert!(row.ends_with(",1,250,250,250,250,900,900,900,900"), "{row}");
    }

    #[test]
    fn summary_has_row_per_kind() {
        let result = small_result(OutputMode::Streaming);
        let csv = export_summary_csv(&result.distributions).unwrap();
        assert_eq!(csv.lines().count(), 9);
        assert!(csv.lines().nth(1).unwrap().starts_with("room_am,14,"));
    }

    #[test]
    fn chain_csv_labels_slots() {
        let result = small_result(OutputMode::Materialize);
        let campaign = &result.campaigns().unwrap()[0];
        let csv = export_chain_csv(campaign).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 169);
        assert!(lines[1].starts_with("0,0,C1,"));
        assert!(lines[25].starts_with("24,1,R1,"));
    }

    #[test]
    fn artifacts_saved_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let result = small_result(OutputMode::Materialize);
        let run_dir = save_artifacts(&result, dir.path()).unwrap();
        for name in ["archive.json", "campaigns.csv", "summary.csv", "report.md"] {
            assert!(run_dir.join(name).exists(), "{name} missing");
        }
        let loaded = load_archive(&run_dir).unwrap();
        assert_eq!(loaded, result.archive());
        let direct = load_archive(&run_dir.join("archive.json")).unwrap();
        assert_eq!(direct.population, 14);
    }
}
