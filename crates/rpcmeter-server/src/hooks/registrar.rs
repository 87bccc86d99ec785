//! Builds the metrics hook set.

use std::sync::Arc;

use rpcmeter_core::error::Result;
use rpcmeter_core::protocol::Outcome;

use crate::context::CallContext;
use crate::obs::Registry;

use super::recorder::MetricRecorder;
use super::HookSet;

/// Quantiles reported by the duration summary unless configured otherwise.
pub const DEFAULT_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

#[derive(Debug, Clone)]
pub struct HookOptions {
    /// Quantile objectives of `rpc_durations_seconds`.
    pub quantiles: Vec<f64>,
}

impl Default for HookOptions {
    fn default() -> Self {
        Self {
            quantiles: DEFAULT_QUANTILES.to_vec(),
        }
    }
}

/// Register the RPC metrics on `registry` (the process-wide registry when
/// `None`) and return hooks that update them.
///
/// Fails if any of the metric names is already taken on that registry; in
/// that case nothing is left registered.
pub fn new_server_hooks(registry: Option<&Registry>) -> Result<HookSet> {
    new_server_hooks_with(registry, &HookOptions::default())
}

pub fn new_server_hooks_with(registry: Option<&Registry>, opts: &HookOptions) -> Result<HookSet> {
    let registry = registry.cloned().unwrap_or_else(Registry::global);

    let recorder = Arc::new(MetricRecorder::new(&opts.quantiles)?);
    recorder.register(&registry)?;
    tracing::info!(metrics = ?registry.names(), "rpc metrics hooks registered");

    Ok(hooks_for(recorder))
}

/// Hooks bound to an existing recorder.
pub fn hooks_for(recorder: Arc<MetricRecorder>) -> HookSet {
    let on_received = Arc::clone(&recorder);
    let on_sent = recorder;
    HookSet {
        request_received: Some(Arc::new(move |ctx: CallContext| on_received.record_request(ctx))),
        response_sent: Some(Arc::new(move |ctx: &CallContext, outcome: &Outcome| {
            on_sent.record_response(ctx, outcome)
        })),
    }
}
