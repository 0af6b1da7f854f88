//! BDD tests for the campaign sweep.
//!
//! These tests verify the engine end to end:
//! - Population size for the full 6+1 permutation sweep
//! - Degenerate constant input
//! - Cancellation and configuration failures
//! - Parallel/sequential agreement and streaming mode
//! - Artifact export of a finished run

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use radonlab_core::data::{generate_pool, RoomPool};
use radonlab_core::CampaignType;
use radonlab_runner::reporting::{export_campaigns_csv, load_archive, save_artifacts};
use radonlab_runner::{
    ConfigError, OutputMode, SimulationConfig, SimulationEngine, SimulationError,
    SimulationProgress, StartRange, StatisticKind,
};

fn synthetic_pool(rooms: usize, cellars: usize, hours: usize) -> RoomPool {
    RoomPool::new(generate_pool(rooms, cellars, hours, 42).unwrap()).unwrap()
}

fn config(campaign_type: CampaignType, start: StartRange) -> SimulationConfig {
    SimulationConfig {
        campaign_type,
        start,
        ..SimulationConfig::default()
    }
}

#[test]
fn bdd_scenario_six_rooms_one_cellar_single_start() {
    // GIVEN six room candidates and one cellar, each exactly one campaign long
    let pool = synthetic_pool(6, 1, 168);

    // WHEN the Six sweep runs with the single valid start offset
    let engine = SimulationEngine::new(config(CampaignType::Six, StartRange::default())).unwrap();
    let result = engine.run(&pool, None, None).expect("sweep should succeed");

    // THEN 6! permutations × 7 cellar slots = 5040 campaigns are produced
    assert_eq!(result.population, 5040);
    assert_eq!(result.offsets, vec![0]);
    let campaigns = result.campaigns().unwrap();
    assert_eq!(campaigns.len(), 5040);

    // AND every campaign uses each room exactly once plus the cellar
    for c in campaigns {
        let ids: HashSet<&str> = c.rooms().iter().map(|r| r.identifier()).collect();
        assert_eq!(ids.len(), 7);
        assert!(ids.contains("C1"));
    }

    // AND every campaign is distinct
    let tags: HashSet<String> = campaigns.iter().map(|c| c.variation_tag()).collect();
    assert_eq!(tags.len(), 5040);

    // AND all eight distributions hold one value per campaign
    assert!(result.distributions.is_consistent());
    for (kind, d) in result.distributions.iter() {
        assert_eq!(d.len(), 5040, "{kind}");
    }
}

#[test]
fn bdd_scenario_constant_input_collapses_distributions() {
    // GIVEN every series holding the same constant concentration
    let c = 123.0;
    let series = ["R1", "R2", "R3", "C1"]
        .into_iter()
        .map(|id| (id, vec![c; 200]));
    let pool = RoomPool::from_series(series).unwrap();

    // WHEN a Two sweep runs over several offsets
    let engine = SimulationEngine::new(config(
        CampaignType::Two,
        StartRange {
            first: 0,
            last: None,
            step: 8,
        },
    ))
    .unwrap();
    let result = engine.run(&pool, None, None).unwrap();

    // THEN every statistic of every campaign equals the constant
    assert!(result.population > 0);
    for (kind, d) in result.distributions.iter() {
        assert!((d.min() - c).abs() < 1e-9, "{kind} min");
        assert!((d.max() - c).abs() < 1e-9, "{kind} max");
        assert!((d.mean() - c).abs() < 1e-9, "{kind} mean");
    }

    // AND per-campaign spread measures are zero
    for campaign in result.campaigns().unwrap() {
        let room = campaign.room_statistics();
        assert!(room.deviation.abs() < 1e-9);
        assert_eq!(room.range, 0.0);
        assert!(room.coefficient_of_variation.abs() < 1e-9);
        assert!(room.quantile_deviation.abs() < 1e-9);
    }
}

#[test]
fn bdd_scenario_cancel_before_first_batch() {
    // GIVEN a valid sweep and a cancel flag that is already set
    let pool = synthetic_pool(6, 1, 200);
    let engine = SimulationEngine::new(config(CampaignType::Six, StartRange::single(0))).unwrap();
    let cancel = AtomicBool::new(true);

    // WHEN the sweep runs
    let outcome = engine.run(&pool, None, Some(&cancel));

    // THEN it reports the cancelled state and no result
    assert!(matches!(outcome, Err(SimulationError::Cancelled)));
}

#[test]
fn bdd_scenario_cancel_mid_sweep_discards_everything() {
    // GIVEN a sweep split into many batches
    let pool = synthetic_pool(6, 1, 168);
    let mut cfg = config(CampaignType::Six, StartRange::single(0));
    cfg.batch_size = 10;
    let engine = SimulationEngine::new(cfg).unwrap();
    let cancel = AtomicBool::new(false);

    // WHEN the progress callback raises the flag after the second batch
    let cb = |p: &SimulationProgress| {
        if p.batches_done == 2 {
            cancel.store(true, Ordering::Relaxed);
        }
    };
    let outcome = engine.run(&pool, Some(&cb), Some(&cancel));

    // THEN the run ends cancelled instead of returning a partial population
    assert!(matches!(outcome, Err(SimulationError::Cancelled)));
}

#[test]
fn bdd_scenario_missing_candidates_are_configuration_errors() {
    // GIVEN pools that cannot fill a Six campaign
    let engine = SimulationEngine::new(config(CampaignType::Six, StartRange::single(0))).unwrap();
    let five_rooms = synthetic_pool(5, 1, 168);
    let no_cellar = synthetic_pool(6, 0, 168);

    // WHEN planning each sweep
    // THEN the specific missing precondition is reported
    assert!(matches!(
        engine.run(&five_rooms, None, None),
        Err(SimulationError::Config(ConfigError::InsufficientRooms { .. }))
    ));
    assert!(matches!(
        engine.run(&no_cellar, None, None),
        Err(SimulationError::Config(ConfigError::NoCellar))
    ));
}

#[test]
fn bdd_scenario_start_beyond_series_is_configuration_error() {
    // GIVEN series with room for only 10 start offsets
    let pool = synthetic_pool(1, 1, 177);

    // WHEN asking for a start past the latest valid one
    let engine = SimulationEngine::new(config(CampaignType::One, StartRange::single(10))).unwrap();

    // THEN the empty offset range is reported with the latest valid start
    match engine.run(&pool, None, None) {
        Err(SimulationError::Config(ConfigError::NoStartOffsets { latest, .. })) => {
            assert_eq!(latest, 9)
        }
        other => panic!("expected NoStartOffsets, got {other:?}"),
    }
}

#[test]
fn bdd_scenario_parallel_matches_sequential() {
    // GIVEN the same sweep configured for parallel and sequential execution
    let pool = synthetic_pool(3, 2, 240);
    let mut cfg = config(
        CampaignType::Three,
        StartRange {
            first: 0,
            last: None,
            step: 36,
        },
    );
    cfg.batch_size = 7;

    // WHEN both run
    let parallel = SimulationEngine::new(cfg.clone())
        .unwrap()
        .run(&pool, None, None)
        .unwrap();
    cfg.parallel = false;
    let sequential = SimulationEngine::new(cfg).unwrap().run(&pool, None, None).unwrap();

    // THEN distributions are bit-identical, including the summed means
    assert_eq!(parallel.distributions, sequential.distributions);
    for kind in StatisticKind::ALL {
        assert_eq!(
            parallel.distribution(kind).mean().to_bits(),
            sequential.distribution(kind).mean().to_bits()
        );
    }
    // AND campaigns come out in the same order
    let order = |r: &radonlab_runner::SimulationResult| -> Vec<(String, usize)> {
        r.campaigns()
            .unwrap_or_default()
            .iter()
            .map(|c| (c.variation_tag(), c.start()))
            .collect()
    };
    assert_eq!(order(&parallel), order(&sequential));
}

#[test]
fn bdd_scenario_streaming_keeps_only_distributions() {
    // GIVEN a sweep run once materialized and once streaming
    let pool = synthetic_pool(3, 1, 200);
    let mut cfg = config(CampaignType::Two, StartRange::single(4));
    let materialized = SimulationEngine::new(cfg.clone())
        .unwrap()
        .run(&pool, None, None)
        .unwrap();
    cfg.mode = OutputMode::Streaming;
    let streamed = SimulationEngine::new(cfg).unwrap().run(&pool, None, None).unwrap();

    // THEN streaming keeps no campaigns but the same distributions
    assert!(streamed.campaigns().is_none());
    assert!(streamed.records().is_empty());
    assert_eq!(streamed.population, materialized.population);
    assert_eq!(streamed.distributions, materialized.distributions);
}

#[test]
fn bdd_scenario_distribution_matches_campaign_statistics() {
    // GIVEN a materialized sweep
    let pool = synthetic_pool(2, 2, 190);
    let result = SimulationEngine::new(config(CampaignType::Two, StartRange::default()))
        .unwrap()
        .run(&pool, None, None)
        .unwrap();

    // WHEN collecting room maxima from the campaigns directly
    let mut maxima: Vec<f64> = result
        .campaigns()
        .unwrap()
        .iter()
        .map(|c| c.room_statistics().maxima)
        .collect();
    maxima.sort_by(f64::total_cmp);

    // THEN the RoomMaximum distribution holds exactly those values
    assert_eq!(
        result.distribution(StatisticKind::RoomMaximum).sorted_values(),
        maxima.as_slice()
    );
}

#[test]
fn bdd_scenario_artifacts_round_trip() {
    // GIVEN a finished run
    let pool = synthetic_pool(2, 1, 180);
    let result = SimulationEngine::new(config(CampaignType::One, StartRange::default()))
        .unwrap()
        .run(&pool, None, None)
        .unwrap();

    // WHEN saving artifacts and loading the archive back
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&result, dir.path()).unwrap();
    let archive = load_archive(&run_dir).unwrap();

    // THEN every field survives the round trip
    assert_eq!(archive, result.archive());
    assert_eq!(archive.dataset_hash, pool.fingerprint());

    // AND the campaigns CSV on disk matches a fresh export
    let on_disk = std::fs::read_to_string(run_dir.join("campaigns.csv")).unwrap();
    assert_eq!(on_disk, export_campaigns_csv(&archive.campaigns).unwrap());
    assert_eq!(on_disk.lines().count() as u64, result.population + 1);
}
