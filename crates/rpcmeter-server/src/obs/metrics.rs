//! Counter and summary instruments.
//!
//! Series live in a `DashMap` keyed by the instrument's label record; each
//! series is a set of atomics, so concurrent updates never take a lock held
//! by this module. Series are created on first observation only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use rpcmeter_core::error::{Result, RpcMeterError};

use super::labels::LabelSet;
use super::registry::{Collector, Desc, MetricFamily, MetricKind, Sample, SampleValue, SummarySnapshot};

/// Monotonic counter partitioned by `L`.
pub struct CounterVec<L: LabelSet> {
    desc: Desc,
    map: DashMap<L, AtomicU64>,
}

impl<L: LabelSet> CounterVec<L> {
    pub fn new(name: &str, help: &str) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(name, help, MetricKind::Counter, L::NAMES)?,
            map: DashMap::new(),
        })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &L) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &L, v: u64) {
        if let Some(counter) = self.map.get(labels) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self
            .map
            .entry(labels.clone())
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value, or `None` if the series was never touched.
    pub fn get(&self, labels: &L) -> Option<u64> {
        self.map.get(labels).map(|c| c.load(Ordering::Relaxed))
    }
}

impl<L: LabelSet> Collector for CounterVec<L> {
    fn desc(&self) -> &Desc {
        &self.desc
    }

    fn collect(&self) -> MetricFamily {
        let mut series: Vec<(L, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.desc.name.clone(),
            help: self.desc.help.clone(),
            kind: MetricKind::Counter,
            samples: series
                .into_iter()
                .map(|(labels, v)| Sample {
                    labels: labels.pairs(),
                    value: SampleValue::Counter(v),
                })
                .collect(),
        }
    }
}

// Log2 bins over nanoseconds: bin 0 holds 0ns, bin k holds [2^(k-1), 2^k).
const NUM_BINS: usize = 65;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

struct AtomicSummary {
    count: AtomicU64,
    sum_nanos: AtomicU64,
    bins: [AtomicU64; NUM_BINS],
}

impl Default for AtomicSummary {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
            bins: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl AtomicSummary {
    // Count first. A concurrent snapshot may see `count` ahead of the bins
    // and sum; quantile ranks use the bin total only.
    fn observe(&self, nanos: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.bins[bin_of(nanos)].fetch_add(1, Ordering::Relaxed);
        self.sum_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn snapshot(&self, objectives: &[f64]) -> SummarySnapshot {
        let counts: Vec<u64> = self.bins.iter().map(|b| b.load(Ordering::Relaxed)).collect();
        let total: u64 = counts.iter().sum();

        SummarySnapshot {
            sample_count: self.count.load(Ordering::Relaxed),
            sample_sum: self.sum_nanos.load(Ordering::Relaxed) as f64 / NANOS_PER_SEC,
            quantiles: objectives
                .iter()
                .map(|&q| (q, estimate_quantile(&counts, total, q) / NANOS_PER_SEC))
                .collect(),
        }
    }
}

fn bin_of(nanos: u64) -> usize {
    (u64::BITS - nanos.leading_zeros()) as usize
}

fn bin_bounds(bin: usize) -> (f64, f64) {
    if bin == 0 {
        return (0.0, 0.0);
    }
    let lower = 2f64.powi(bin as i32 - 1);
    (lower, lower * 2.0)
}

/// Estimate the `q` quantile in nanoseconds by locating the bin that holds
/// the target rank and interpolating linearly inside it. NaN when empty.
fn estimate_quantile(counts: &[u64], total: u64, q: f64) -> f64 {
    if total == 0 {
        return f64::NAN;
    }

    let rank = ((q * total as f64).ceil() as u64).clamp(1, total);
    let mut cumulative = 0u64;
    for (bin, &n) in counts.iter().enumerate() {
        if n == 0 {
            continue;
        }
        if cumulative + n >= rank {
            let (lower, upper) = bin_bounds(bin);
            let fraction = (rank - cumulative) as f64 / n as f64;
            return lower + fraction * (upper - lower);
        }
        cumulative += n;
    }

    bin_bounds(NUM_BINS - 1).1
}

/// Duration summary partitioned by `L`: count, sum and estimated quantiles,
/// all in seconds.
pub struct SummaryVec<L: LabelSet> {
    desc: Desc,
    objectives: Vec<f64>,
    map: DashMap<L, AtomicSummary>,
}

impl<L: LabelSet> SummaryVec<L> {
    /// `objectives` are the quantiles to report, each in `(0, 1]`.
    pub fn new(name: &str, help: &str, objectives: &[f64]) -> Result<Self> {
        let desc = Desc::new(name, help, MetricKind::Summary, L::NAMES)?;

        if let Some(&q) = objectives.iter().find(|q| !(**q > 0.0 && **q <= 1.0)) {
            return Err(RpcMeterError::InvalidObjective {
                metric: name.to_string(),
                quantile: q,
            });
        }
        let mut objectives = objectives.to_vec();
        objectives.sort_by(f64::total_cmp);
        objectives.dedup();

        Ok(Self {
            desc,
            objectives,
            map: DashMap::new(),
        })
    }

    /// Record one observation.
    pub fn observe(&self, labels: &L, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        if let Some(s) = self.map.get(labels) {
            s.observe(nanos);
            return;
        }
        let s = self.map.entry(labels.clone()).or_default();
        s.observe(nanos);
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// Snapshot of one series, or `None` if it was never observed.
    pub fn get(&self, labels: &L) -> Option<SummarySnapshot> {
        self.map.get(labels).map(|s| s.snapshot(&self.objectives))
    }
}

impl<L: LabelSet> Collector for SummaryVec<L> {
    fn desc(&self) -> &Desc {
        &self.desc
    }

    fn collect(&self) -> MetricFamily {
        let mut series: Vec<(L, SummarySnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot(&self.objectives)))
            .collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.desc.name.clone(),
            help: self.desc.help.clone(),
            kind: MetricKind::Summary,
            samples: series
                .into_iter()
                .map(|(labels, snap)| Sample {
                    labels: labels.pairs(),
                    value: SampleValue::Summary(snap),
                })
                .collect(),
        }
    }
}
