//! Classification of a finished call.

use std::borrow::Cow;

use super::code::{ErrorCode, RpcError};

/// HTTP status recorded for a successful call.
pub const STATUS_OK: u16 = 200;

/// How a call ended, as seen by the response-sent hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handler returned a response; carries the HTTP status written.
    Success(u16),
    /// Handler failed (or panicked) with a structured error code.
    Failure(ErrorCode),
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome::Success(STATUS_OK)
    }

    /// Classify a handler result without consuming it.
    pub fn of<T>(res: &Result<T, RpcError>) -> Self {
        match res {
            Ok(_) => Outcome::ok(),
            Err(e) => Outcome::Failure(e.code()),
        }
    }

    /// Value of the `status` label: the numeric HTTP status on success, the
    /// error code string on failure.
    pub fn status_label(&self) -> Cow<'static, str> {
        match self {
            Outcome::Success(STATUS_OK) => Cow::Borrowed("200"),
            Outcome::Success(code) => Cow::Owned(code.to_string()),
            Outcome::Failure(code) => Cow::Borrowed(code.as_str()),
        }
    }

    /// HTTP status the transport writes for this outcome.
    pub fn http_status(&self) -> u16 {
        match self {
            Outcome::Success(code) => *code,
            Outcome::Failure(code) => code.http_status(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
