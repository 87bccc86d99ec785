//! Lightweight in-process metrics.
//!
//! Instruments are stored as atomics inside `DashMap`s keyed by typed label
//! records, registered by name in a [`Registry`], and rendered in the
//! Prometheus text exposition format by the `/metrics` handler.

pub mod labels;
pub mod metrics;
pub mod registry;

pub use labels::{LabelSet, MethodLabels, MethodStatusLabels};
pub use metrics::{CounterVec, SummaryVec};
pub use registry::{Collector, Desc, MetricFamily, MetricKind, Registry, Sample, SampleValue, SummarySnapshot};
