//! Error types and the failure taxonomy used in fault results

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure category attached to a fault result.
///
/// The serialized name is what callers see in the `error_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// A required setting (the target URL) is missing
    #[serde(rename = "ConfigurationError")]
    Configuration,

    /// Connection refused, reset or otherwise not established
    #[serde(rename = "TransportError")]
    Transport,

    /// Deadline exceeded
    #[serde(rename = "TimeoutError")]
    Timeout,

    /// TLS negotiation failure
    #[serde(rename = "ProtocolError")]
    Protocol,

    /// Remote answered with an HTTP error status
    #[serde(rename = "HttpError")]
    Http,

    /// Remote answered successfully but too slowly
    #[serde(rename = "LatencyThresholdExceeded")]
    LatencyThresholdExceeded,

    /// Any other outbound request failure
    #[serde(rename = "RequestError")]
    Request,

    /// Allocation or thread creation failed
    #[serde(rename = "ResourceExhaustion")]
    ResourceExhaustion,

    /// Unanticipated failure inside a routine
    #[serde(rename = "InternalError")]
    Internal,
}

impl ErrorType {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "ConfigurationError",
            ErrorType::Transport => "TransportError",
            ErrorType::Timeout => "TimeoutError",
            ErrorType::Protocol => "ProtocolError",
            ErrorType::Http => "HttpError",
            ErrorType::LatencyThresholdExceeded => "LatencyThresholdExceeded",
            ErrorType::Request => "RequestError",
            ErrorType::ResourceExhaustion => "ResourceExhaustion",
            ErrorType::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to obtain a memory block
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The allocator refused the request
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The requested size cannot be represented
    #[error("capacity overflow for {0} bytes")]
    CapacityOverflow(usize),
}

impl From<std::collections::TryReserveError> for AllocationError {
    fn from(err: std::collections::TryReserveError) -> Self {
        AllocationError::OutOfMemory(err.to_string())
    }
}

/// Failure to construct an outbound HTTP client
#[derive(Debug, Error)]
#[error("failed to build HTTP client")]
pub struct ClientBuildError(#[from] pub reqwest::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_wire_names_match_serde() {
        for kind in [
            ErrorType::Configuration,
            ErrorType::Transport,
            ErrorType::Timeout,
            ErrorType::Protocol,
            ErrorType::Http,
            ErrorType::LatencyThresholdExceeded,
            ErrorType::Request,
            ErrorType::ResourceExhaustion,
            ErrorType::Internal,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_try_reserve_maps_to_out_of_memory() {
        let err = Vec::<u8>::new().try_reserve_exact(usize::MAX).unwrap_err();
        assert!(matches!(AllocationError::from(err), AllocationError::OutOfMemory(_)));
    }
}
