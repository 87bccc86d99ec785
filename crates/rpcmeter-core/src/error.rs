//! Shared error type across rpcmeter crates.
//!
//! Request-time RPC failures are not represented here: they are values
//! ([`crate::protocol::RpcError`]) that flow into the status label. This enum
//! covers construction and configuration faults, which abort startup.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, RpcMeterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error, PartialEq)]
pub enum RpcMeterError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("duplicate metric registration: {0}")]
    DuplicateMetric(String),
    #[error("invalid metric name: {0:?}")]
    InvalidMetricName(String),
    #[error("invalid label schema for {metric}: {reason}")]
    InvalidLabelSchema { metric: String, reason: String },
    #[error("invalid summary objective for {metric}: {quantile} is outside (0, 1]")]
    InvalidObjective { metric: String, quantile: f64 },
    #[error("internal: {0}")]
    Internal(String),
}

impl RpcMeterError {
    /// True for faults that must stop the server from starting.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            RpcMeterError::DuplicateMetric(_)
                | RpcMeterError::InvalidMetricName(_)
                | RpcMeterError::InvalidLabelSchema { .. }
                | RpcMeterError::InvalidObjective { .. }
        )
    }
}
