//! Metric registry and text exposition.
//!
//! A `Registry` maps metric names to collectors. Names are unique per
//! registry: registering a second collector under a taken name is an error,
//! surfaced to whoever constructs the instruments. The registry is a cheap
//! `Clone` handle, so tests can build isolated registries while the binary
//! shares [`Registry::global`].

use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use rpcmeter_core::error::{Result, RpcMeterError};

use super::labels::{is_metric_name, validate_label_names};

/// Instrument type, as written in `# TYPE` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Summary,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Summary => "summary",
        }
    }

    /// Label names this kind of instrument reserves for its own samples.
    fn reserved_labels(self) -> &'static [&'static str] {
        match self {
            MetricKind::Counter => &[],
            MetricKind::Summary => &["quantile"],
        }
    }
}

/// Validated description of one instrument.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: &'static [&'static str],
}

impl Desc {
    pub fn new(
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &'static [&'static str],
    ) -> Result<Self> {
        if !is_metric_name(name) {
            return Err(RpcMeterError::InvalidMetricName(name.to_string()));
        }
        validate_label_names(name, label_names, kind.reserved_labels())?;
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names,
        })
    }
}

/// Point-in-time view of one summary series.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub sample_count: u64,
    /// Sum of observations, in seconds.
    pub sample_sum: f64,
    /// `(quantile, estimated value in seconds)`, ascending by quantile.
    pub quantiles: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Counter(u64),
    Summary(SummarySnapshot),
}

/// One time series: its label pairs and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(&'static str, String)>,
    pub value: SampleValue,
}

impl Sample {
    pub fn counter(&self) -> Option<u64> {
        match &self.value {
            SampleValue::Counter(v) => Some(*v),
            SampleValue::Summary(_) => None,
        }
    }

    pub fn summary(&self) -> Option<&SummarySnapshot> {
        match &self.value {
            SampleValue::Summary(s) => Some(s),
            SampleValue::Counter(_) => None,
        }
    }
}

/// Everything gathered for one metric name. Samples are sorted by label
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Find the sample whose labels are exactly `labels` (order-insensitive).
    pub fn find(&self, labels: &[(&str, &str)]) -> Option<&Sample> {
        self.samples.iter().find(|s| {
            s.labels.len() == labels.len()
                && labels
                    .iter()
                    .all(|(k, v)| s.labels.iter().any(|(sk, sv)| sk == k && sv == v))
        })
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", self.name, self.kind.as_str());
        for s in &self.samples {
            let label_str = s
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");

            match &s.value {
                SampleValue::Counter(v) => {
                    let _ = writeln!(out, "{}{} {}", self.name, braces(&label_str), v);
                }
                SampleValue::Summary(snap) => {
                    let prefix = if label_str.is_empty() {
                        String::new()
                    } else {
                        format!("{},", label_str)
                    };
                    for (q, v) in &snap.quantiles {
                        let _ = writeln!(out, "{}{{{}quantile=\"{}\"}} {}", self.name, prefix, q, v);
                    }
                    let _ = writeln!(out, "{}_sum{} {}", self.name, braces(&label_str), snap.sample_sum);
                    let _ = writeln!(out, "{}_count{} {}", self.name, braces(&label_str), snap.sample_count);
                }
            }
        }
    }
}

/// Anything the registry can gather from.
pub trait Collector: Send + Sync {
    fn desc(&self) -> &Desc;
    fn collect(&self) -> MetricFamily;
}

/// Name-keyed collection of instruments.
#[derive(Clone, Default)]
pub struct Registry {
    collectors: Arc<DashMap<String, Arc<dyn Collector>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide default registry.
    pub fn global() -> Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new).clone()
    }

    /// Register `collector` under its descriptor name.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.desc().name.clone();
        match self.collectors.entry(name) {
            Entry::Occupied(e) => Err(RpcMeterError::DuplicateMetric(e.key().clone())),
            Entry::Vacant(e) => {
                tracing::debug!(metric = %e.key(), "metric registered");
                e.insert(collector);
                Ok(())
            }
        }
    }

    /// Remove a collector. Returns whether one was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.collectors.remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.collectors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collectors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Collect every family that has at least one series, sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let collectors: Vec<Arc<dyn Collector>> =
            self.collectors.iter().map(|e| Arc::clone(e.value())).collect();

        let mut families: Vec<MetricFamily> = collectors
            .iter()
            .map(|c| c.collect())
            .filter(|f| !f.samples.is_empty())
            .collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        families
    }

    /// Gather and look up a single family.
    pub fn family(&self, name: &str) -> Option<MetricFamily> {
        let collector = self.collectors.get(name).map(|e| Arc::clone(e.value()))?;
        let family = collector.collect();
        (!family.samples.is_empty()).then_some(family)
    }

    /// Render in Prometheus text exposition format (0.0.4).
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for family in self.gather() {
            family.render(&mut out);
        }
        out
    }
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn braces(label_str: &str) -> String {
    if label_str.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", label_str)
    }
}
