//! Fixed-shape label records.
//!
//! Each instrument is generic over one `LabelSet`, so every observation on a
//! given instrument carries exactly the same label names. The names are
//! checked once, when the instrument is created.

use std::borrow::Cow;
use std::hash::Hash;

use rpcmeter_core::error::{Result, RpcMeterError};

/// A record whose fields are the label values of one time series.
pub trait LabelSet: Clone + Eq + Hash + Ord + Send + Sync + 'static {
    /// Label names, in exposition order.
    const NAMES: &'static [&'static str];

    /// Label values, aligned with [`LabelSet::NAMES`].
    fn values(&self) -> Vec<&str>;

    /// Owned `(name, value)` pairs.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        Self::NAMES
            .iter()
            .copied()
            .zip(self.values().into_iter().map(str::to_owned))
            .collect()
    }
}

/// `{method}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodLabels {
    pub method: String,
}

impl MethodLabels {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }
}

impl LabelSet for MethodLabels {
    const NAMES: &'static [&'static str] = &["method"];

    fn values(&self) -> Vec<&str> {
        vec![self.method.as_str()]
    }
}

/// `{method, status}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodStatusLabels {
    pub method: String,
    pub status: String,
}

impl MethodStatusLabels {
    pub fn new(method: impl Into<String>, status: Cow<'_, str>) -> Self {
        Self {
            method: method.into(),
            status: status.into_owned(),
        }
    }
}

impl LabelSet for MethodStatusLabels {
    const NAMES: &'static [&'static str] = &["method", "status"];

    fn values(&self) -> Vec<&str> {
        vec![self.method.as_str(), self.status.as_str()]
    }
}

/// Check a label schema: valid identifiers, no reserved `__` prefix, no
/// duplicates, and none of the names in `reserved`.
pub(crate) fn validate_label_names(metric: &str, names: &[&str], reserved: &[&str]) -> Result<()> {
    let schema_err = |reason: String| RpcMeterError::InvalidLabelSchema {
        metric: metric.to_string(),
        reason,
    };

    for (i, name) in names.iter().enumerate() {
        if !is_label_name(name) {
            return Err(schema_err(format!("invalid label name {name:?}")));
        }
        if name.starts_with("__") {
            return Err(schema_err(format!("label name {name:?} is reserved")));
        }
        if reserved.contains(name) {
            return Err(schema_err(format!("label name {name:?} is reserved for this metric type")));
        }
        if names[..i].contains(name) {
            return Err(schema_err(format!("duplicate label name {name:?}")));
        }
    }
    Ok(())
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Metric names additionally allow `:`.
pub(crate) fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_follow_declared_order() {
        let l = MethodStatusLabels::new("MakeHat", Cow::Borrowed("200"));
        assert_eq!(
            l.pairs(),
            vec![("method", "MakeHat".to_string()), ("status", "200".to_string())]
        );
    }

    #[test]
    fn schema_rejections() {
        assert!(validate_label_names("m", &["method", "status"], &["quantile"]).is_ok());
        assert!(validate_label_names("m", &["9lives"], &[]).is_err());
        assert!(validate_label_names("m", &["__name"], &[]).is_err());
        assert!(validate_label_names("m", &["method", "method"], &[]).is_err());
        assert!(matches!(
            validate_label_names("m", &["quantile"], &["quantile"]),
            Err(RpcMeterError::InvalidLabelSchema { .. })
        ));
    }

    #[test]
    fn metric_names() {
        assert!(is_metric_name("rpc_requests_total"));
        assert!(is_metric_name("ns:rpc_total"));
        assert!(!is_metric_name(""));
        assert!(!is_metric_name("rpc-requests"));
        assert!(!is_metric_name("1rpc"));
    }
}
