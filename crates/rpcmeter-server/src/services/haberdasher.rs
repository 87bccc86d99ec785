//! Hat-making fixture service.
//!
//! `Haberdasher::noop()` answers every `MakeHat` with a default `Hat`;
//! `Haberdasher::new()` validates the size and picks a hat from it.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rpcmeter_core::protocol::RpcError;

use crate::dispatch::{decode_body, RpcService};

pub const SERVICE_NAME: &str = "twirp.internal.twirptest.Haberdasher";
pub const MAKE_HAT: &str = "MakeHat";

const COLORS: [&str; 5] = ["white", "black", "brown", "red", "blue"];
const NAMES: [&str; 4] = ["bowler", "baseball cap", "top hat", "derby"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Size {
    pub inches: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hat {
    pub size: i32,
    pub color: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Haberdasher {
    noop: bool,
}

impl Haberdasher {
    pub fn new() -> Self {
        Self { noop: false }
    }

    pub fn noop() -> Self {
        Self { noop: true }
    }

    pub fn make_hat(&self, size: Size) -> Result<Hat, RpcError> {
        if self.noop {
            return Ok(Hat::default());
        }
        if size.inches <= 0 {
            return Err(RpcError::invalid_argument("inches", "I can't make a hat that small!"));
        }
        let i = size.inches.unsigned_abs() as usize;
        Ok(Hat {
            size: size.inches,
            color: COLORS[i % COLORS.len()].to_string(),
            name: NAMES[i % NAMES.len()].to_string(),
        })
    }
}

#[async_trait]
impl RpcService for Haberdasher {
    fn name(&self) -> &'static str {
        SERVICE_NAME
    }

    fn methods(&self) -> &'static [&'static str] {
        &[MAKE_HAT]
    }

    async fn call(&self, method: &str, body: Bytes) -> Result<Value, RpcError> {
        match method {
            MAKE_HAT => {
                let size: Size = decode_body(&body)?;
                let hat = self.make_hat(size)?;
                serde_json::to_value(hat)
                    .map_err(|e| RpcError::internal(format!("failed to encode hat: {e}")))
            }
            other => Err(RpcError::bad_route(format!("unknown method: {other}"))),
        }
    }
}
