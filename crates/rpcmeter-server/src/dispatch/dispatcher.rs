use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use rpcmeter_core::protocol::{Outcome, Route, RpcError};

use crate::context::CallContext;
use crate::hooks::HookSet;

/// An RPC service: a named set of methods taking and returning JSON.
#[async_trait]
pub trait RpcService: Send + Sync {
    /// Fully qualified name, e.g. `twirp.internal.twirptest.Haberdasher`.
    fn name(&self) -> &'static str;
    fn methods(&self) -> &'static [&'static str];
    async fn call(&self, method: &str, body: Bytes) -> Result<Value, RpcError>;
}

/// Decode a JSON request body. An empty body is the default message.
pub fn decode_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| RpcError::malformed(format!("failed to parse request json: {e}")))
}

/// Routes calls to registered services and fires the lifecycle hooks around
/// each routed call.
pub struct Dispatcher {
    services: DashMap<&'static str, Arc<dyn RpcService>>,
    hooks: HookSet,
}

impl Dispatcher {
    pub fn new(hooks: HookSet) -> Self {
        Self {
            services: DashMap::new(),
            hooks,
        }
    }

    pub fn register(&self, svc: Arc<dyn RpcService>) {
        self.services.insert(svc.name(), svc);
    }

    /// Run one call.
    ///
    /// Unknown services and methods fail with `bad_route` before any hook
    /// runs, so only routed method names ever become label values. For a
    /// routed call, request-received runs before the handler and
    /// response-sent runs after it on every path that returns, including a
    /// handler panic, which is recovered into an `internal` error.
    pub async fn dispatch(&self, route: &Route, body: Bytes) -> Result<Value, RpcError> {
        let handler = self
            .services
            .get(route.service.as_str())
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| {
                tracing::debug!(service = %route.service, "unknown service");
                RpcError::bad_route(format!("unknown service: {}", route.service))
            })?;

        if !handler.methods().iter().any(|m| *m == route.method) {
            tracing::debug!(service = %route.service, method = %route.method, "unknown method");
            return Err(RpcError::bad_route(format!(
                "unknown method: {}/{}",
                route.service, route.method
            )));
        }

        let ctx = self
            .hooks
            .on_request_received(CallContext::new(&route.service, &route.method));

        let res = match AssertUnwindSafe(handler.call(&route.method, body))
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(panic) => {
                let msg = panic_message(&*panic);
                tracing::error!(service = %route.service, method = %route.method, panic = %msg, "handler panicked");
                Err(RpcError::internal(format!("handler panicked: {msg}")))
            }
        };

        self.hooks.on_response_sent(&ctx, &Outcome::of(&res));
        res
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
