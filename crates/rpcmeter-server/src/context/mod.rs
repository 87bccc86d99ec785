//! Per-call context shared between the host pipeline and the hooks.

pub mod call;

pub use call::CallContext;
