#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use rpcmeter_core::RpcMeterError;
use rpcmeter_server::app_state::AppState;
use rpcmeter_server::config;
use rpcmeter_server::obs::Registry;
use rpcmeter_server::router::build_router;
use rpcmeter_server::services::Haberdasher;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
metrics:
  quantilez: [0.5] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, RpcMeterError::BadRequest(_)), "{err}");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.prefix, "/twirp");
    assert!(cfg.metrics.enabled);
    assert_eq!(cfg.metrics.path, "/metrics");
    assert_eq!(cfg.metrics.quantiles, vec![0.5, 0.9, 0.99]);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
  prefix: ""
metrics:
  enabled: true
  path: "/internal/metrics"
  quantiles: [0.5, 1.0]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.metrics.hook_options().quantiles, vec![0.5, 1.0]);
}

#[test]
fn rejects_bad_values() {
    let cases = [
        ("version: 2\n", RpcMeterError::UnsupportedVersion),
        (
            "version: 1\nserver: { listen: \"nope\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nserver: { prefix: \"twirp\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nserver: { prefix: \"/twirp/\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { path: \"metrics\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { path: \"/twirp/metrics\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { path: \"/healthz\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { path: \"/:x\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { path: \"/stats/*rest\" }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
        (
            "version: 1\nmetrics: { quantiles: [0.0] }\n",
            RpcMeterError::BadRequest(String::new()),
        ),
    ];

    for (yaml, want) in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&want),
            "yaml={yaml} err={err}"
        );
    }
}

#[test]
fn every_accepted_config_builds_a_router() {
    let cases = [
        "version: 1\n",
        "version: 1\nmetrics: { path: \"/internal/metrics\" }\n",
        "version: 1\nmetrics: { enabled: false, path: \"/healthz\" }\n",
        "version: 1\nserver: { prefix: \"\" }\nmetrics: { path: \"/stats\" }\n",
    ];

    for yaml in cases {
        let cfg = config::load_from_str(yaml).expect(yaml);
        let state = AppState::build(cfg, Registry::new(), vec![Arc::new(Haberdasher::noop())])
            .expect(yaml);
        let _router = build_router(state);
    }
}
