//! Server lifecycle hooks.
//!
//! A [`HookSet`] is what the host pipeline consumes: one callback before
//! dispatch and one after. [`new_server_hooks`] builds a set bound to the
//! RPC metrics on a registry.

pub mod recorder;
pub mod registrar;

use std::fmt;
use std::sync::Arc;

use rpcmeter_core::protocol::Outcome;

use crate::context::CallContext;

pub use recorder::{MetricRecorder, DURATIONS_SECONDS, REQUESTS_TOTAL, RESPONSES_TOTAL};
pub use registrar::{hooks_for, new_server_hooks, new_server_hooks_with, HookOptions, DEFAULT_QUANTILES};

/// Called once the method is known, before dispatch. Returns the context the
/// rest of the call carries.
pub type RequestReceivedFn = Arc<dyn Fn(CallContext) -> CallContext + Send + Sync>;

/// Called after dispatch, success or failure, before output is written.
pub type ResponseSentFn = Arc<dyn Fn(&CallContext, &Outcome) + Send + Sync>;

/// Lifecycle callbacks attached to the host's execution pipeline.
/// Unset callbacks are no-ops.
#[derive(Clone, Default)]
pub struct HookSet {
    pub request_received: Option<RequestReceivedFn>,
    pub response_sent: Option<ResponseSentFn>,
}

impl HookSet {
    /// A set with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request_received(&self, ctx: CallContext) -> CallContext {
        match &self.request_received {
            Some(f) => f(ctx),
            None => ctx,
        }
    }

    pub fn on_response_sent(&self, ctx: &CallContext, outcome: &Outcome) {
        if let Some(f) = &self.response_sent {
            f(ctx, outcome);
        }
    }

    /// Compose sets so each callback runs in order. Request-received threads
    /// the context through every set.
    pub fn chain(sets: impl IntoIterator<Item = HookSet>) -> HookSet {
        let sets: Vec<HookSet> = sets.into_iter().collect();

        let received: Vec<RequestReceivedFn> =
            sets.iter().filter_map(|s| s.request_received.clone()).collect();
        let sent: Vec<ResponseSentFn> = sets.iter().filter_map(|s| s.response_sent.clone()).collect();

        HookSet {
            request_received: (!received.is_empty()).then(|| -> RequestReceivedFn {
                Arc::new(move |ctx: CallContext| received.iter().fold(ctx, |ctx, f| f(ctx)))
            }),
            response_sent: (!sent.is_empty()).then(|| -> ResponseSentFn {
                Arc::new(move |ctx: &CallContext, outcome: &Outcome| {
                    for f in &sent {
                        f(ctx, outcome);
                    }
                })
            }),
        }
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("request_received", &self.request_received.is_some())
            .field("response_sent", &self.response_sent.is_some())
            .finish()
    }
}
