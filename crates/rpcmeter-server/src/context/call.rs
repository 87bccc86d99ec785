use std::time::{Duration, Instant};

/// State for one in-flight RPC: which method was routed and, once the
/// request-received hook has run, when the call started.
#[derive(Debug, Clone)]
pub struct CallContext {
    service: String,
    method: String,
    started_at: Option<Instant>,
}

impl CallContext {
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            started_at: None,
        }
    }

    /// Stamp the start time.
    pub fn with_start(mut self, at: Instant) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Monotonic time since the stamp, if there is one.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }
}
