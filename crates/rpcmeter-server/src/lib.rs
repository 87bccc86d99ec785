//! rpcmeter server library entry.
//!
//! This crate wires the lifecycle hooks, the metrics registry, the dispatcher
//! and the HTTP transport into a small RPC server. It is consumed by the
//! binary (`main.rs`) and by integration tests; embedders that bring their
//! own RPC host only need `hooks`, `context` and `obs`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod hooks;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod transport;

pub use hooks::{new_server_hooks, HookSet};
