//! Shared application state for the rpcmeter server.
//!
//! Construction wires the metrics hooks into the dispatcher and registers the
//! RPC services. Instrumentation errors are returned, so `main` refuses to
//! start rather than serve uninstrumented.

use std::sync::Arc;

use rpcmeter_core::error::Result;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, RpcService};
use crate::hooks::{new_server_hooks_with, HookSet};
use crate::obs::Registry;
use crate::services::Haberdasher;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Registry,
}

impl AppState {
    /// Built-in services, metrics on the process-wide registry.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::build(cfg, Registry::global(), vec![Arc::new(Haberdasher::new())])
    }

    pub fn build(
        cfg: ServerConfig,
        registry: Registry,
        services: Vec<Arc<dyn RpcService>>,
    ) -> Result<Self> {
        // 1) Hooks (fail fast on registration errors)
        let hooks = if cfg.metrics.enabled {
            new_server_hooks_with(Some(&registry), &cfg.metrics.hook_options())?
        } else {
            tracing::warn!("metrics disabled; rpc calls are not instrumented");
            HookSet::new()
        };

        // 2) Services
        let dispatcher = Dispatcher::new(hooks);
        for svc in services {
            tracing::info!(service = svc.name(), methods = ?svc.methods(), "service registered");
            dispatcher.register(svc);
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry }),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
