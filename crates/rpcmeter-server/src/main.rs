//! rpcmeter server
//!
//! Serves the built-in RPC services over HTTP with request/response/duration
//! metrics exposed for scraping.
//! - RPC endpoint: POST /twirp/<package.Service>/<Method>
//! - Metrics: GET /metrics

use tracing_subscriber::{fmt, EnvFilter};

use rpcmeter_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "rpcmeter.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen = cfg.server.listen_addr().expect("server.listen must be a valid SocketAddr");

    // Mis-registered instrumentation must stop startup.
    let state = app_state::AppState::new(cfg).expect("instrumentation setup failed");
    let app = router::build_router(state);

    tracing::info!(%listen, "rpcmeter-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
