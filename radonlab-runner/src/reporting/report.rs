//! Markdown summary of a simulation archive.

use crate::distribution::StatisticKind;
use crate::result::SimulationArchive;

/// Reference level in Bq/m³ used for the exceedance column.
pub const REFERENCE_LEVEL: f64 = 300.0;

/// Generate a Markdown report for one simulation run.
pub fn generate_report(archive: &SimulationArchive) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Campaign Simulation Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Campaign Type | {} |\n", archive.campaign_type));
    md.push_str(&format!(
        "| Room Candidates | {} |\n",
        archive.room_ids.join(", ")
    ));
    md.push_str(&format!(
        "| Cellar Candidates | {} |\n",
        archive.cellar_ids.join(", ")
    ));
    md.push_str(&format!("| Start Offsets | {} |\n", describe_offsets(&archive.offsets)));
    md.push_str(&format!("| Campaigns | {} |\n", archive.population));
    md.push_str(&format!("| Mode | {:?} |\n", archive.config.mode));
    md.push_str(&format!("| Elapsed | {:.2}s |\n", archive.elapsed_secs));
    md.push_str(&format!("| Dataset Hash | {} |\n", archive.dataset_hash));
    md.push('\n');

    md.push_str("## Population Distributions\n\n");
    md.push_str("| Statistic | Mean | Min | Q05 | Median | Q95 | Max |");
    md.push_str(&format!(" ≥ {REFERENCE_LEVEL:.0} |\n"));
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for (kind, d) in archive.distributions.iter() {
        md.push_str(&format!(
            "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1}% |\n",
            kind,
            d.mean(),
            d.min(),
            d.quantile(5.0),
            d.median(),
            d.quantile(95.0),
            d.max(),
            d.exceedance(REFERENCE_LEVEL) * 100.0
        ));
    }
    md.push('\n');

    // Room vs cellar comparison is only meaningful with a population.
    if archive.population > 0 {
        let room = archive.distributions.get(StatisticKind::RoomMean).mean();
        let cellar = archive.distributions.get(StatisticKind::CellarMean).mean();
        md.push_str("## Room / Cellar\n\n");
        if room > 0.0 {
            md.push_str(&format!(
                "Average cellar mean is {:.2}× the average room mean.\n\n",
                cellar / room
            ));
        } else {
            md.push_str("Average room mean is zero.\n\n");
        }
    }

    md
}

fn describe_offsets(offsets: &[usize]) -> String {
    match offsets {
        [] => "none".to_string(),
        [only] => only.to_string(),
        [first, second, ..] => {
            let last = offsets[offsets.len() - 1];
            format!("{first}..={last} step {} ({} offsets)", second - first, offsets.len())
        }
    }
}
