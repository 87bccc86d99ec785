//! Maps lifecycle events onto the three RPC instruments.
//!
//! The recorder never fails and never locks: every mutation goes straight to
//! an atomic series inside the instrument.

use std::sync::Arc;
use std::time::Instant;

use rpcmeter_core::error::Result;
use rpcmeter_core::protocol::Outcome;

use crate::context::CallContext;
use crate::obs::{Collector, CounterVec, MethodLabels, MethodStatusLabels, Registry, SummaryVec};

pub const REQUESTS_TOTAL: &str = "rpc_requests_total";
pub const RESPONSES_TOTAL: &str = "rpc_responses_total";
pub const DURATIONS_SECONDS: &str = "rpc_durations_seconds";

/// Owner of the request counter, response counter and duration summary.
pub struct MetricRecorder {
    requests: Arc<CounterVec<MethodLabels>>,
    responses: Arc<CounterVec<MethodStatusLabels>>,
    durations: Arc<SummaryVec<MethodStatusLabels>>,
}

impl MetricRecorder {
    /// Build the instruments. Nothing is registered yet.
    pub fn new(quantiles: &[f64]) -> Result<Self> {
        Ok(Self {
            requests: Arc::new(CounterVec::new(
                REQUESTS_TOTAL,
                "RPC requests received, by method.",
            )?),
            responses: Arc::new(CounterVec::new(
                RESPONSES_TOTAL,
                "RPC responses sent, by method and status.",
            )?),
            durations: Arc::new(SummaryVec::new(
                DURATIONS_SECONDS,
                "RPC latency from request received to response sent, in seconds.",
                quantiles,
            )?),
        })
    }

    /// Register all three instruments, or none: on the first failure the
    /// ones already added are removed again.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        let collectors: [Arc<dyn Collector>; 3] = [
            self.requests.clone(),
            self.responses.clone(),
            self.durations.clone(),
        ];

        for (i, c) in collectors.iter().enumerate() {
            if let Err(e) = registry.register(Arc::clone(c)) {
                for done in &collectors[..i] {
                    registry.unregister(&done.desc().name);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Request-received: count the arrival and stamp the start time.
    pub fn record_request(&self, ctx: CallContext) -> CallContext {
        let now = Instant::now();
        self.requests.inc(&MethodLabels::new(ctx.method()));
        tracing::trace!(service = %ctx.service(), method = %ctx.method(), "rpc request received");
        ctx.with_start(now)
    }

    /// Response-sent: count the response and observe the elapsed time under
    /// the same `{method, status}` labels. A context that was never stamped
    /// is still counted but contributes no duration.
    pub fn record_response(&self, ctx: &CallContext, outcome: &Outcome) {
        let labels = MethodStatusLabels::new(ctx.method(), outcome.status_label());
        self.responses.inc(&labels);
        if let Some(elapsed) = ctx.elapsed() {
            self.durations.observe(&labels, elapsed);
        }
        tracing::trace!(
            service = %ctx.service(),
            method = %ctx.method(),
            status = %labels.status,
            "rpc response sent"
        );
    }
}
