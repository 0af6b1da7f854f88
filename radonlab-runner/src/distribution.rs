//! Population distributions: one per statistic kind, over every generated campaign.
//!
//! Workers accumulate into `DistributionBuilder`s that hold sorted runs. Merging
//! two builders only concatenates runs, so merging is associative and
//! commutative. `finish` performs a heap-based k-way merge into one ascending
//! vector; quantiles then use the same index policy as per-campaign statistics.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use radonlab_core::stats;
use radonlab_core::{Campaign, SubsetStatistics};
use serde::{Deserialize, Serialize};

/// The eight per-campaign statistics tracked across the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    RoomMean,
    RoomGeometricMean,
    RoomMedian,
    RoomMaximum,
    CellarMean,
    CellarGeometricMean,
    CellarMedian,
    CellarMaximum,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 8] = [
        StatisticKind::RoomMean,
        StatisticKind::RoomGeometricMean,
        StatisticKind::RoomMedian,
        StatisticKind::RoomMaximum,
        StatisticKind::CellarMean,
        StatisticKind::CellarGeometricMean,
        StatisticKind::CellarMedian,
        StatisticKind::CellarMaximum,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short column label, e.g. `room_am`.
    pub fn label(self) -> &'static str {
        match self {
            StatisticKind::RoomMean => "room_am",
            StatisticKind::RoomGeometricMean => "room_gm",
            StatisticKind::RoomMedian => "room_median",
            StatisticKind::RoomMaximum => "room_max",
            StatisticKind::CellarMean => "cellar_am",
            StatisticKind::CellarGeometricMean => "cellar_gm",
            StatisticKind::CellarMedian => "cellar_median",
            StatisticKind::CellarMaximum => "cellar_max",
        }
    }

    /// Pick this statistic from a campaign's room/cellar statistics.
    pub fn extract(self, room: &SubsetStatistics, cellar: &SubsetStatistics) -> f64 {
        match self {
            StatisticKind::RoomMean => room.mean,
            StatisticKind::RoomGeometricMean => room.geometric_mean,
            StatisticKind::RoomMedian => room.median,
            StatisticKind::RoomMaximum => room.maxima,
            StatisticKind::CellarMean => cellar.mean,
            StatisticKind::CellarGeometricMean => cellar.geometric_mean,
            StatisticKind::CellarMedian => cellar.median,
            StatisticKind::CellarMaximum => cellar.maxima,
        }
    }
}

impl std::fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Running accumulation of one statistic: sorted runs plus an unsorted tail.
#[derive(Debug, Clone, Default)]
pub struct DistributionBuilder {
    runs: Vec<Vec<f64>>,
    pending: Vec<f64>,
}

impl DistributionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.pending.push(value);
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.runs.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort the pending tail into a run.
    pub fn seal(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut run = std::mem::take(&mut self.pending);
        run.sort_by(f64::total_cmp);
        self.runs.push(run);
    }

    pub fn merge(mut self, other: DistributionBuilder) -> Self {
        self.runs.extend(other.runs);
        self.pending.extend(other.pending);
        self
    }

    /// Merge all runs into a finished distribution.
    pub fn finish(mut self) -> Distribution {
        self.seal();
        Distribution::from_sorted(kway_merge(self.runs))
    }
}

struct Head {
    value: f64,
    run: usize,
    pos: usize,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    // Reversed so BinaryHeap pops the smallest value first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| other.run.cmp(&self.run))
    }
}

fn kway_merge(mut runs: Vec<Vec<f64>>) -> Vec<f64> {
    runs.retain(|r| !r.is_empty());
    match runs.len() {
        0 => return Vec::new(),
        1 => return runs.pop().unwrap_or_default(),
        _ => {}
    }

    let total = runs.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    let mut heap: BinaryHeap<Head> = runs
        .iter()
        .enumerate()
        .map(|(run, r)| Head {
            value: r[0],
            run,
            pos: 0,
        })
        .collect();

    while let Some(Head { value, run, pos }) = heap.pop() {
        out.push(value);
        let next = pos + 1;
        if let Some(&v) = runs[run].get(next) {
            heap.push(Head {
                value: v,
                run,
                pos: next,
            });
        }
    }
    out
}

/// Finished, sorted distribution of one statistic over the campaign population.
///
/// Values are re-sorted on deserialization, so quantiles stay valid for any archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DistributionData", into = "DistributionData")]
pub struct Distribution {
    values: Vec<f64>,
}

/// Stored form of a `Distribution`.
#[derive(Serialize, Deserialize)]
struct DistributionData {
    values: Vec<f64>,
}

impl From<DistributionData> for Distribution {
    fn from(data: DistributionData) -> Self {
        let mut values = data.values;
        values.sort_by(f64::total_cmp);
        Self::from_sorted(values)
    }
}

impl From<Distribution> for DistributionData {
    fn from(distribution: Distribution) -> Self {
        Self {
            values: distribution.values,
        }
    }
}

impl Distribution {
    /// Build from values in any order.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(sorted)
    }

    fn from_sorted(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ascending values.
    pub fn sorted_values(&self) -> &[f64] {
        &self.values
    }

    /// Arithmetic mean, summed in ascending order so the result does not depend
    /// on how the population was partitioned across workers.
    pub fn mean(&self) -> f64 {
        stats::mean(&self.values)
    }

    pub fn deviation(&self) -> f64 {
        stats::population_deviation(&self.values, self.mean())
    }

    pub fn median(&self) -> f64 {
        stats::median_sorted(&self.values)
    }

    /// p-th quantile (0..=100) using `floor(N * p / 100) - 1`, clamped.
    pub fn quantile(&self, p: f64) -> f64 {
        stats::quantile_sorted(&self.values, p)
    }

    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    /// Fraction of campaigns at or above `threshold` (e.g. a reference level).
    pub fn exceedance(&self, threshold: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let below = self.values.partition_point(|v| *v < threshold);
        (self.values.len() - below) as f64 / self.values.len() as f64
    }
}

/// Running accumulators for all eight statistic kinds.
#[derive(Debug, Clone, Default)]
pub struct PopulationAccumulator {
    builders: [DistributionBuilder; 8],
    count: u64,
}

impl PopulationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, campaign: &Campaign) {
        self.push_statistics(campaign.room_statistics(), campaign.cellar_statistics());
    }

    pub fn push_statistics(&mut self, room: &SubsetStatistics, cellar: &SubsetStatistics) {
        for kind in StatisticKind::ALL {
            self.builders[kind.index()].push(kind.extract(room, cellar));
        }
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn seal(&mut self) {
        for b in &mut self.builders {
            b.seal();
        }
    }

    pub fn merge(self, other: PopulationAccumulator) -> Self {
        let count = self.count + other.count;
        let mut others = other.builders.into_iter();
        let builders = self.builders.map(|b| match others.next() {
            Some(o) => b.merge(o),
            None => b,
        });
        Self { builders, count }
    }

    pub fn finish(self) -> PopulationDistributions {
        PopulationDistributions {
            distributions: self.builders.map(DistributionBuilder::finish),
        }
    }
}

/// Finished distributions for all eight statistic kinds; equal lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationDistributions {
    distributions: [Distribution; 8],
}

impl PopulationDistributions {
    pub fn get(&self, kind: StatisticKind) -> &Distribution {
        &self.distributions[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatisticKind, &Distribution)> {
        StatisticKind::ALL
            .into_iter()
            .map(move |k| (k, &self.distributions[k.index()]))
    }

    /// Population size (identical for every kind).
    pub fn len(&self) -> usize {
        self.distributions[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every kind has the same number of values.
    pub fn is_consistent(&self) -> bool {
        let n = self.len();
        self.distributions.iter().all(|d| d.len() == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialized_distribution_is_sorted() {
        let d: Distribution = serde_json::from_str(r#"{"values":[9.0,1.0,5.0,3.0]}"#).unwrap();
        assert_eq!(d.sorted_values(), &[1.0, 3.0, 5.0, 9.0]);
        assert_eq!(d.min(), 1.0);
        assert_eq!(d.max(), 9.0);
        assert_eq!(d.median(), 3.0);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"values":[1.0,3.0,5.0,9.0]}"#);
    }

    #[test]
    fn builder_merges_runs_in_order() {
        let mut a = DistributionBuilder::new();
        for v in [5.0, 1.0, 3.0] {
            a.push(v);
        }
        a.seal();
        let mut b = DistributionBuilder::new();
        for v in [4.0, 2.0, 6.0, 0.5] {
            b.push(v);
        }
        let d = a.merge(b).finish();
        assert_eq!(d.sorted_values(), &[0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn merge_is_order_independent() {
        let make = |vals: &[f64]| {
            let mut b = DistributionBuilder::new();
            vals.iter().for_each(|v| b.push(*v));
            b.seal();
            b
        };
        let x = make(&[3.0, 9.0, 1.0]);
        let y = make(&[2.0, 8.0]);
        let z = make(&[7.0]);
        let left = x.clone().merge(y.clone()).merge(z.clone()).finish();
        let right = z.merge(y).merge(x).finish();
        assert_eq!(left, right);
        assert_eq!(left.mean().to_bits(), right.mean().to_bits());
    }

    #[test]
    fn quantiles_follow_index_policy() {
        let values: Vec<f64> = (1..=20).rev().map(|i| i as f64).collect();
        let d = Distribution::from_values(&values);
        assert_eq!(d.quantile(5.0), 1.0);
        assert_eq!(d.quantile(95.0), 19.0);
        assert_eq!(d.median(), 10.0);
        assert_eq!(d.min(), 1.0);
        assert_eq!(d.max(), 20.0);
        assert!((d.mean() - 10.5).abs() < 1e-12);
    }

    #[test]
    fn exceedance_fraction() {
        let d = Distribution::from_values(&[100.0, 200.0, 300.0, 400.0]);
        assert_eq!(d.exceedance(300.0), 0.5);
        assert_eq!(d.exceedance(0.0), 1.0);
        assert_eq!(d.exceedance(1000.0), 0.0);
    }

    #[test]
    fn empty_distribution_is_zeroed() {
        let d = DistributionBuilder::new().finish();
        assert!(d.is_empty());
        assert_eq!(d.mean(), 0.0);
        assert_eq!(d.median(), 0.0);
        assert_eq!(d.quantile(95.0), 0.0);
    }

    #[test]
    fn accumulator_tracks_all_kinds() {
        let room = SubsetStatistics::compute(&[1.0, 2.0, 3.0]);
        let cellar = SubsetStatistics::compute(&[10.0, 20.0, 30.0]);
        let mut acc = PopulationAccumulator::new();
        acc.push_statistics(&room, &cellar);
        acc.push_statistics(&room, &cellar);
        let other = {
            let mut o = PopulationAccumulator::new();
            o.push_statistics(&cellar, &room);
            o
        };
        let acc = acc.merge(other);
        assert_eq!(acc.count(), 3);
        let dists = acc.finish();
        assert!(dists.is_consistent());
        assert_eq!(dists.len(), 3);
        assert_eq!(
            dists.get(StatisticKind::RoomMaximum).sorted_values(),
            &[3.0, 3.0, 30.0]
        );
        assert_eq!(
            dists.get(StatisticKind::CellarMaximum).sorted_values(),
            &[3.0, 30.0, 30.0]
        );
    }

    #[test]
    fn kind_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            StatisticKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), 8);
        for (i, k) in StatisticKind::ALL.iter().enumerate() {
            assert_eq!(k.index(), i);
        }
    }
}
