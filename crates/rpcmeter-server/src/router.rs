//! Axum router wiring.
//!
//! - `POST {prefix}/:service/:method` : RPC calls
//! - `GET /healthz`                   : liveness
//! - `GET {metrics.path}`             : Prometheus text format

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let cfg = state.cfg();
    let rpc_path = format!("{}/:service/:method", cfg.server.prefix);

    let mut router = Router::new()
        .route(&rpc_path, post(transport::http::rpc))
        .route(ops::HEALTHZ_PATH, get(ops::healthz));

    if cfg.metrics.enabled {
        router = router.route(&cfg.metrics.path, get(ops::metrics));
    }

    router.with_state(state)
}
