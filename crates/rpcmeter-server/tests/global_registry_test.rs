//! Default-registry construction. Kept in its own test binary because it
//! mutates process-wide state.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpcmeter_core::protocol::Outcome;
use rpcmeter_core::RpcMeterError;
use rpcmeter_server::app_state::AppState;
use rpcmeter_server::config::ServerConfig;
use rpcmeter_server::context::CallContext;
use rpcmeter_server::hooks::{new_server_hooks, REQUESTS_TOTAL, RESPONSES_TOTAL};
use rpcmeter_server::obs::Registry;

#[test]
fn default_registry_rejects_second_hook_set() {
    let hooks = new_server_hooks(None).unwrap();
    let global = Registry::global();
    assert!(global.is_registered(REQUESTS_TOTAL));

    let err = new_server_hooks(None).unwrap_err();
    assert_eq!(err, RpcMeterError::DuplicateMetric(REQUESTS_TOTAL.to_string()));

    // A server on the default registry must refuse to start now.
    let err = AppState::new(ServerConfig::default()).err().expect("must fail");
    assert!(err.is_construction_error(), "{err}");

    let ctx = hooks.on_request_received(CallContext::new("test.Svc", "Ping"));
    hooks.on_response_sent(&ctx, &Outcome::ok());
    let responses = global.family(RESPONSES_TOTAL).unwrap();
    assert_eq!(
        responses.find(&[("method", "Ping"), ("status", "200")]).unwrap().counter(),
        Some(1)
    );
}
