//! Built-in RPC services.

pub mod haberdasher;

pub use haberdasher::{Hat, Haberdasher, Size};
