//! End-to-end over a real socket: RPC calls, then a scrape.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rpcmeter_server::app_state::AppState;
use rpcmeter_server::config::ServerConfig;
use rpcmeter_server::obs::Registry;
use rpcmeter_server::router::build_router;
use rpcmeter_server::services::Haberdasher;

const MAKE_HAT_PATH: &str = "/twirp/twirp.internal.twirptest.Haberdasher/MakeHat";

/// Serve the router on an ephemeral port; returns the base URL.
async fn spawn_server(cfg: ServerConfig) -> String {
    let state = AppState::build(cfg, Registry::new(), vec![Arc::new(Haberdasher::noop())]).unwrap();
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// POST a raw JSON body; returns (status, decoded body).
async fn post_json(client: &Client, url: &str, body: &'static str) -> (StatusCode, Value) {
    let res = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn scrape(client: &Client, base: &str) -> String {
    let res = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    res.text().await.unwrap()
}

#[tokio::test]
async fn make_hat_then_scrape() {
    let base = spawn_server(ServerConfig::default()).await;
    let client = Client::new();

    let (status, hat) = post_json(&client, &format!("{base}{MAKE_HAT_PATH}"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hat["size"], 0);

    let text = scrape(&client, &base).await;
    assert!(text.contains("# TYPE rpc_requests_total counter\n"), "{text}");
    assert!(text.contains("rpc_requests_total{method=\"MakeHat\"} 1\n"), "{text}");
    assert!(text.contains("# TYPE rpc_responses_total counter\n"), "{text}");
    assert!(
        text.contains("rpc_responses_total{method=\"MakeHat\",status=\"200\"} 1\n"),
        "{text}"
    );
    assert!(text.contains("# TYPE rpc_durations_seconds summary\n"), "{text}");
    assert!(
        text.contains("rpc_durations_seconds{method=\"MakeHat\",status=\"200\",quantile=\"0.5\"} "),
        "{text}"
    );
    assert!(
        text.contains("rpc_durations_seconds_count{method=\"MakeHat\",status=\"200\"} 1\n"),
        "{text}"
    );
}

#[tokio::test]
async fn keep_alive_client_sees_every_call() {
    let base = spawn_server(ServerConfig::default()).await;
    let client = Client::new();
    let url = format!("{base}{MAKE_HAT_PATH}");

    for _ in 0..3 {
        let res = client.post(&url).json(&json!({ "inches": 7 })).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let hat: Value = res.json().await.unwrap();
        assert_eq!(hat["size"], 0);
    }

    let text = scrape(&client, &base).await;
    assert!(text.contains("rpc_requests_total{method=\"MakeHat\"} 3\n"), "{text}");
    assert!(
        text.contains("rpc_durations_seconds_count{method=\"MakeHat\",status=\"200\"} 3\n"),
        "{text}"
    );
}

#[tokio::test]
async fn failures_are_labelled_by_error_code() {
    let base = spawn_server(ServerConfig::default()).await;
    let client = Client::new();

    let (status, err) = post_json(&client, &format!("{base}{MAKE_HAT_PATH}"), "{\"inches\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "malformed");

    let text = scrape(&client, &base).await;
    assert!(text.contains("rpc_requests_total{method=\"MakeHat\"} 1\n"), "{text}");
    assert!(
        text.contains("rpc_responses_total{method=\"MakeHat\",status=\"malformed\"} 1\n"),
        "{text}"
    );
    assert!(!text.contains("status=\"200\""), "{text}");
}

#[tokio::test]
async fn bad_routes_are_not_instrumented() {
    let base = spawn_server(ServerConfig::default()).await;
    let client = Client::new();

    let (status, err) = post_json(
        &client,
        &format!("{base}/twirp/twirp.internal.twirptest.Haberdasher/MakeShoe"),
        "{}",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "bad_route");

    let res = client
        .post(format!("{base}{MAKE_HAT_PATH}"))
        .header(CONTENT_TYPE, "text/plain")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["code"], "bad_route");

    assert_eq!(scrape(&client, &base).await, "");
}

#[tokio::test]
async fn healthz_and_disabled_metrics() {
    let mut cfg = ServerConfig::default();
    cfg.metrics.enabled = false;
    let base = spawn_server(cfg).await;
    let client = Client::new();

    let res = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    let (status, _) = post_json(&client, &format!("{base}{MAKE_HAT_PATH}"), "{}").await;
    assert_eq!(status, StatusCode::OK);

    let res = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
