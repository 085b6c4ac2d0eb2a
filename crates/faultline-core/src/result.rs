//! Fault result envelope
//!
//! Every routine ends by building exactly one [`FaultResult`]. The result is
//! serialized straight into the HTTP response body and then dropped.

use crate::error::ErrorType;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fault routines exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    HighMemory,
    Snat,
    HighCpu,
    Threads,
    BadWrite,
    BadTls,
    SlowCall,
}

impl FaultKind {
    /// All kinds, in route order
    pub const ALL: [FaultKind; 7] = [
        FaultKind::HighMemory,
        FaultKind::Snat,
        FaultKind::HighCpu,
        FaultKind::Threads,
        FaultKind::BadWrite,
        FaultKind::BadTls,
        FaultKind::SlowCall,
    ];

    /// Route segment under `/api/faults/`
    pub fn name(&self) -> &'static str {
        match self {
            FaultKind::HighMemory => "highmemory",
            FaultKind::Snat => "snat",
            FaultKind::HighCpu => "highcpu",
            FaultKind::Threads => "threads",
            FaultKind::BadWrite => "badwrite",
            FaultKind::BadTls => "badtls",
            FaultKind::SlowCall => "slowcall",
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            FaultKind::HighMemory => "High memory",
            FaultKind::Snat => "SNAT",
            FaultKind::HighCpu => "High CPU",
            FaultKind::Threads => "Thread exhaustion",
            FaultKind::BadWrite => "Bad write",
            FaultKind::BadTls => "Bad TLS",
            FaultKind::SlowCall => "Slow call",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown fault name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fault '{0}'")]
pub struct UnknownFault(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FaultKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| UnknownFault(s.to_string()))
    }
}

/// How the invocation ended, from the point of view of the fault's goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Routine ran to completion and reports a normal result
    Success,
    /// The abnormal condition under test was reached and is being signalled
    PartialFailure,
    /// The routine could not run (missing configuration, internal error)
    Fatal,
}

impl Outcome {
    /// Outward HTTP status for this outcome
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Success => 200,
            Outcome::PartialFailure | Outcome::Fatal => 500,
        }
    }
}

/// A single metric value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Float(f64),
    Text(String),
    Null,
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        MetricValue::Count(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::Count(value as u64)
    }
}

impl From<u16> for MetricValue {
    fn from(value: u16) -> Self {
        MetricValue::Count(u64::from(value))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetricValue::Null, Into::into)
    }
}

/// Result of one fault invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FaultResult {
    pub kind: FaultKind,
    pub message: String,
    pub metrics: BTreeMap<String, MetricValue>,
    pub outcome: Outcome,
    pub error_type: Option<ErrorType>,
}

impl FaultResult {
    /// A completed run reported with a 200
    pub fn success(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metrics: BTreeMap::new(),
            outcome: Outcome::Success,
            error_type: None,
        }
    }

    /// The fault's condition was reached; reported with a failure-class status
    /// but a regular `message` body.
    pub fn signalled(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::PartialFailure,
            ..Self::success(kind, message)
        }
    }

    /// A classified failure; the body carries `error` and `error_type`
    pub fn failure(kind: FaultKind, error_type: ErrorType, error: impl Into<String>) -> Self {
        let outcome = match error_type {
            ErrorType::Configuration | ErrorType::Internal => Outcome::Fatal,
            _ => Outcome::PartialFailure,
        };
        Self {
            kind,
            message: error.into(),
            metrics: BTreeMap::new(),
            outcome,
            error_type: Some(error_type),
        }
    }

    /// Catch-all result for a routine that failed unexpectedly
    pub fn internal(kind: FaultKind, details: impl fmt::Display) -> Self {
        Self::failure(kind, ErrorType::Internal, format!("{} fault failed", kind.label()))
            .with_metric("details", details.to_string())
    }

    /// Attach a metric, replacing any previous value under the same key
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    /// Look up a metric by key
    pub fn metric(&self, key: &str) -> Option<&MetricValue> {
        self.metrics.get(key)
    }

    /// Outward HTTP status
    pub fn status_code(&self) -> u16 {
        self.outcome.status_code()
    }

    /// Whether the envelope uses the `error` shape
    pub fn is_error(&self) -> bool {
        self.error_type.is_some()
    }
}

impl Serialize for FaultResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self.error_type {
            Some(error_type) => {
                map.serialize_entry("error", &self.message)?;
                map.serialize_entry("error_type", error_type.as_str())?;
            }
            None => map.serialize_entry("message", &self.message)?,
        }
        for (key, value) in &self.metrics {
            if matches!(key.as_str(), "message" | "error" | "error_type") {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fault_kind_parses_route_names() {
        for kind in FaultKind::ALL {
            assert_eq!(kind.name().parse::<FaultKind>().unwrap(), kind);
        }
        assert_eq!("HighCPU".parse::<FaultKind>().unwrap(), FaultKind::HighCpu);
        assert!("diskfull".parse::<FaultKind>().is_err());
    }

    #[test]
    fn test_success_envelope_is_flat() {
        let result = FaultResult::success(FaultKind::HighMemory, "Memory allocation stopped after 3 blocks")
            .with_metric("allocated_gb", 3u64);

        assert_eq!(result.status_code(), 200);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"message": "Memory allocation stopped after 3 blocks", "allocated_gb": 3})
        );
    }

    #[test]
    fn test_failure_envelope_uses_error_keys() {
        let result = FaultResult::failure(FaultKind::BadTls, ErrorType::Configuration, "Target URL is not configured")
            .with_metric("url", None::<String>)
            .with_metric("details", "set FAULTLINE_TARGET_URL");

        assert_eq!(result.outcome, Outcome::Fatal);
        assert_eq!(result.status_code(), 500);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "error": "Target URL is not configured",
                "error_type": "ConfigurationError",
                "url": null,
                "details": "set FAULTLINE_TARGET_URL"
            })
        );
    }

    #[test]
    fn test_signalled_keeps_message_shape_with_500() {
        let result = FaultResult::signalled(FaultKind::Threads, "done").with_metric("threads_created", 10usize);
        assert_eq!(result.status_code(), 500);
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["message"], "done");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_metrics_cannot_shadow_envelope_keys() {
        let result = FaultResult::success(FaultKind::Snat, "ok").with_metric("message", "shadow");
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"message": "ok"}));
    }

    #[test]
    fn test_internal_names_the_fault() {
        let result = FaultResult::internal(FaultKind::HighCpu, "worker panicked");
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["error"], "High CPU fault failed");
        assert_eq!(body["error_type"], "InternalError");
        assert_eq!(body["details"], "worker panicked");
    }
}
