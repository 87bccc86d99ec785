//! RPC over HTTP.
//!
//! Requests are `POST {prefix}/<package.Service>/<Method>` with a JSON body
//! (empty means the default message). Success is `200` with the JSON reply;
//! failure is the error code's HTTP status with `{"code", "msg"}`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use rpcmeter_core::protocol::{Route, RpcError};

use crate::app_state::AppState;

pub async fn rpc(State(app): State<AppState>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let route = match Route::parse(&app.cfg().server.prefix, uri.path()) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        let ct = ct.to_str().unwrap_or_default();
        if !ct.starts_with("application/json") {
            return error_response(RpcError::bad_route(format!(
                "unexpected Content-Type: {ct:?}"
            )));
        }
    }

    match app.dispatcher().dispatch(&route, body).await {
        Ok(v) => (StatusCode::OK, Json(v)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: RpcError) -> Response {
    let status =
        StatusCode::from_u16(e.code().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(e)).into_response()
}
