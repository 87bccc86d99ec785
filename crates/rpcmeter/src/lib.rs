//! Top-level facade crate for rpcmeter.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use rpcmeter_core::*;
}

pub mod server {
    pub use rpcmeter_server::*;
}

pub use rpcmeter_server::{new_server_hooks, HookSet};
