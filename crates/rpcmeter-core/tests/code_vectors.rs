//! Error code table vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpcmeter_core::protocol::{ErrorCode, Outcome, RpcError};

use vector_loader::CodeVector;

#[test]
fn code_vectors() {
    let vectors: Vec<CodeVector> = vector_loader::load("error_codes.json");
    assert_eq!(vectors.len(), ErrorCode::ALL.len());

    for v in vectors {
        let code: ErrorCode = v.code.parse().expect("known code");
        assert_eq!(code.as_str(), v.code, "vector={}", v.description);
        assert_eq!(code.http_status(), v.http_status, "vector={}", v.description);

        let outcome = Outcome::Failure(code);
        assert_eq!(outcome.status_label(), v.code.as_str(), "vector={}", v.description);
        assert_eq!(outcome.http_status(), v.http_status, "vector={}", v.description);
    }
}

#[test]
fn unknown_code_is_rejected() {
    let err = "teapot".parse::<ErrorCode>().expect_err("must fail");
    assert!(err.to_string().contains("teapot"));
}

#[test]
fn success_label_is_numeric_status() {
    assert_eq!(Outcome::ok().status_label(), "200");
    assert_eq!(Outcome::Success(204).status_label(), "204");
    assert!(Outcome::ok().is_success());
}

#[test]
fn outcome_of_result() {
    let ok: Result<(), RpcError> = Ok(());
    assert_eq!(Outcome::of(&ok), Outcome::Success(200));

    let err: Result<(), RpcError> = Err(RpcError::new(ErrorCode::NotFound, "no hat"));
    assert_eq!(Outcome::of(&err), Outcome::Failure(ErrorCode::NotFound));
}

#[test]
fn rpc_error_json_shape() {
    let e = RpcError::invalid_argument("inches", "I can't make a hat that small!");
    let v = serde_json::to_value(&e).unwrap();
    assert_eq!(v["code"], "invalid_argument");
    assert_eq!(v["msg"], "inches I can't make a hat that small!");

    let back: RpcError = serde_json::from_value(v).unwrap();
    assert_eq!(back, e);
}
