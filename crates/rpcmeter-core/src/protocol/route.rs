//! Route parsing (panic-free).
//!
//! Paths look like `/<prefix>/<package.Service>/<Method>`. The prefix may be
//! empty. Anything else is a `bad_route` for the caller to report.

use super::code::RpcError;

/// Parsed RPC route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Fully qualified service name, e.g. `twirp.internal.twirptest.Haberdasher`.
    pub service: String,
    /// Method name, e.g. `MakeHat`.
    pub method: String,
}

impl Route {
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
        }
    }

    /// Parse `path` under `prefix` (e.g. `/twirp`).
    pub fn parse(prefix: &str, path: &str) -> Result<Self, RpcError> {
        let prefix = prefix.trim_end_matches('/');
        let rest = path
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| RpcError::bad_route(format!("no handler for path {path:?}")))?;

        let (service, method) = rest
            .split_once('/')
            .ok_or_else(|| RpcError::bad_route(format!("no handler for path {path:?}")))?;

        if !is_service_name(service) || !is_ident(method) {
            return Err(RpcError::bad_route(format!("no handler for path {path:?}")));
        }

        Ok(Self::new(service, method))
    }

    /// Path this route is served at under `prefix`.
    pub fn path(&self, prefix: &str) -> String {
        format!("{}/{}/{}", prefix.trim_end_matches('/'), self.service, self.method)
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_service_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_ident)
}
