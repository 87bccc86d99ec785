//! Transport layer (HTTP + JSON).

pub mod http;
