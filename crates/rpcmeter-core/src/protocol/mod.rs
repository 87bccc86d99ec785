//! RPC protocol primitives shared by the host pipeline and the hooks.
//!
//! - `code`: structured error codes and the `RpcError` value handlers return.
//! - `outcome`: how a finished call is classified for the status label.
//! - `route`: parsing of `/<prefix>/<package.Service>/<Method>` paths.

pub mod code;
pub mod outcome;
pub mod route;

pub use code::{ErrorCode, RpcError};
pub use outcome::Outcome;
pub use route::Route;
