//! RadonLab CLI: campaign simulation, synthetic input, archive inspection.
//!
//! Commands:
//! - `simulate`: run the campaign sweep over an hourly CSV and save artifacts
//! - `synth`: write a synthetic hourly CSV for trials and demos
//! - `inspect`: print the report of a saved archive

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use radonlab_core::data::{generate_pool, HourlyTable, RoomPool};
use radonlab_core::CampaignType;
use radonlab_runner::reporting::{
    export_chain_csv, generate_report, load_archive, save_artifacts,
};
use radonlab_runner::{
    OutputMode, SimulationConfig, SimulationEngine, SimulationProgress, SimulationResult,
    StatisticKind,
};

#[derive(Parser)]
#[command(
    name = "radonlab",
    about = "RadonLab CLI: 6+1 radon campaign simulator"
)]
struct Cli {
    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the campaign sweep over an hourly CSV table.
    Simulate {
        /// Hourly CSV: one column per room (R*/C* identifiers), one row per hour.
        #[arg(long)]
        input: PathBuf,

        /// TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Campaign type: six, five, four, three, two, one (or 6..1).
        #[arg(long = "type")]
        campaign_type: Option<CampaignType>,

        /// First start offset (hours).
        #[arg(long)]
        first: Option<usize>,

        /// Last start offset (hours). Defaults to the latest the data allows.
        #[arg(long)]
        last: Option<usize>,

        /// Step between start offsets (hours).
        #[arg(long)]
        step: Option<usize>,

        /// Keep only distributions, not every campaign.
        #[arg(long, default_value_t = false)]
        stream: bool,

        /// Disable parallel execution.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Worker threads for a dedicated pool.
        #[arg(long)]
        threads: Option<usize>,

        /// Also write the hourly chain of the campaign with this index.
        #[arg(long)]
        chain: Option<usize>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Write a synthetic hourly CSV table.
    Synth {
        /// Number of room series (R1..).
        #[arg(long, default_value_t = 6)]
        rooms: usize,

        /// Number of cellar series (C1..).
        #[arg(long, default_value_t = 1)]
        cellars: usize,

        /// Hours per series.
        #[arg(long, default_value_t = 336)]
        hours: usize,

        /// Master seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the report of a saved archive (file or artifact directory).
    Inspect {
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let sink = logging::build(cli.log_file.as_deref(), cli.log_json)?;
    let outcome = tracing::subscriber::with_default(sink.subscriber, || run(cli.command));
    // Flush buffered log lines before reporting the outcome.
    drop(sink.guard);
    outcome
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Simulate {
            input,
            config,
            campaign_type,
            first,
            last,
            step,
            stream,
            sequential,
            threads,
            chain,
            output_dir,
        } => {
            let mut cfg = match config {
                Some(path) => SimulationConfig::load(&path)?,
                None => SimulationConfig::default(),
            };
            if let Some(t) = campaign_type {
                cfg.campaign_type = t;
            }
            if let Some(first) = first {
                cfg.start.first = first;
            }
            if last.is_some() {
                cfg.start.last = last;
            }
            if let Some(step) = step {
                cfg.start.step = step;
            }
            if stream {
                cfg.mode = OutputMode::Streaming;
            }
            if sequential {
                cfg.parallel = false;
            }
            if threads.is_some() {
                cfg.threads = threads;
            }
            run_simulate(&input, cfg, chain, &output_dir)
        }
        Commands::Synth {
            rooms,
            cellars,
            hours,
            seed,
            output,
        } => run_synth(rooms, cellars, hours, seed, &output),
        Commands::Inspect { archive } => {
            let archive = load_archive(&archive)?;
            print!("{}", generate_report(&archive));
            Ok(())
        }
    }
}

fn run_simulate(
    input: &Path,
    config: SimulationConfig,
    chain: Option<usize>,
    output_dir: &Path,
) -> Result<()> {
    if chain.is_some() && config.mode == OutputMode::Streaming {
        bail!("--chain needs materialized campaigns; drop --stream");
    }

    let table = HourlyTable::from_csv_path(input)?;
    let pool = RoomPool::from_table(table)
        .with_context(|| format!("invalid input table {}", input.display()))?;
    info!(
        input = %input.display(),
        rooms = pool.rooms().len(),
        cellars = pool.cellars().len(),
        excluded = pool.excluded().len(),
        "input loaded"
    );

    let engine = SimulationEngine::new(config)?;
    let plan = engine.plan(&pool)?;
    info!(expected = %plan.expected, offsets = plan.offsets.len(), "starting sweep");

    let report_progress = |p: &SimulationProgress| {
        info!(
            percent = p.percent(),
            batch = p.batches_done,
            batches = p.batches_total,
            "progress"
        );
    };
    let result = engine.run(&pool, Some(&report_progress), None)?;

    print_summary(&result);

    let run_dir = save_artifacts(&result, output_dir)?;
    if let Some(index) = chain {
        let campaign = result
            .campaigns()
            .and_then(|c| c.get(index))
            .with_context(|| {
                format!(
                    "campaign index {index} out of range (population {})",
                    result.population
                )
            })?;
        std::fs::write(run_dir.join("chain.csv"), export_chain_csv(campaign)?)?;
    }
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_synth(rooms: usize, cellars: usize, hours: usize, seed: u64, output: &Path) -> Result<()> {
    let series = generate_pool(rooms, cellars, hours, seed)?;
    let ids: Vec<String> = series.iter().map(|s| s.identifier().to_string()).collect();
    let columns: Vec<Vec<f64>> = series.iter().map(|s| s.values().to_vec()).collect();

    if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let file = std::fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    HourlyTable::write_csv(&ids, &columns, file)?;

    info!(rooms, cellars, hours, seed, output = %output.display(), "synthetic table written");
    println!(
        "Wrote {} series × {hours} hours to {}",
        ids.len(),
        output.display()
    );
    Ok(())
}

fn print_summary(result: &SimulationResult) {
    println!("Campaign type : {}", result.campaign_type);
    println!("Campaigns     : {}", result.population);
    println!("Start offsets : {}", result.offsets.len());
    println!("Elapsed       : {:.2}s", result.elapsed_secs);
    println!();
    println!(
        "{:<14} {:>10} {:>10} {:>10} {:>10}",
        "statistic", "mean", "q05", "median", "q95"
    );
    for kind in StatisticKind::ALL {
        let d = result.distribution(kind);
        println!(
            "{:<14} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            kind.label(),
            d.mean(),
            d.quantile(5.0),
            d.median(),
            d.quantile(95.0)
        );
    }
}
