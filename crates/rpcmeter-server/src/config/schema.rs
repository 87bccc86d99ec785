use std::net::SocketAddr;

use serde::Deserialize;
use rpcmeter_core::error::{Result, RpcMeterError};

use crate::hooks::{HookOptions, DEFAULT_QUANTILES};
use crate::ops::HEALTHZ_PATH;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RpcMeterError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.metrics.validate()?;

        let prefix = &self.server.prefix;
        if self.metrics.enabled
            && !prefix.is_empty()
            && self.metrics.path.starts_with(&format!("{prefix}/"))
        {
            return Err(RpcMeterError::BadRequest(
                "metrics.path must not live under server.prefix".into(),
            ));
        }
        Ok(())
    }
}

/// A config with every section at its default.
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path prefix RPC routes are served under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            prefix: default_prefix(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.prefix.is_empty() && (!self.prefix.starts_with('/') || self.prefix.ends_with('/')) {
            return Err(RpcMeterError::BadRequest(
                "server.prefix must be empty or start with '/' and not end with '/'".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| RpcMeterError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_metrics_path")]
    pub path: String,

    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_metrics_path(),
            quantiles: default_quantiles(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(RpcMeterError::BadRequest("metrics.path must start with '/'".into()));
        }
        // Mounted as a literal route: no captures, no wildcards.
        if self.path.contains([':', '*']) {
            return Err(RpcMeterError::BadRequest(
                "metrics.path must not contain ':' or '*'".into(),
            ));
        }
        if self.enabled && self.path == HEALTHZ_PATH {
            return Err(RpcMeterError::BadRequest(format!(
                "metrics.path must not be {HEALTHZ_PATH}"
            )));
        }
        if let Some(q) = self.quantiles.iter().find(|q| !(**q > 0.0 && **q <= 1.0)) {
            return Err(RpcMeterError::BadRequest(format!(
                "metrics.quantiles: {q} must be in (0, 1]"
            )));
        }
        Ok(())
    }

    pub fn hook_options(&self) -> HookOptions {
        HookOptions {
            quantiles: self.quantiles.clone(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_prefix() -> String {
    "/twirp".into()
}
fn default_enabled() -> bool {
    true
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_quantiles() -> Vec<f64> {
    DEFAULT_QUANTILES.to_vec()
}
