//! rpcmeter core: transport-agnostic RPC protocol primitives and the shared
//! error surface.
//!
//! This crate defines the structured RPC error codes, call outcomes and route
//! parsing used by the server-side hooks and the host pipeline. It carries no
//! transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RpcMeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RpcMeterError};
