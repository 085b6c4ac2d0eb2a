//! Downgraded-TLS simulator
//!
//! Calls the configured target with the protocol pinned to an obsolete TLS
//! version and certificate checks disabled, then reports how it failed.

use super::{classify, configured, describe, missing_target, TlsVersion, TransportProfile};
use crate::error::ErrorType;
use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Downgraded-TLS tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default = "default_version")]
    pub min_version: TlsVersion,

    #[serde(default = "default_version")]
    pub max_version: TlsVersion,

    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_true")]
    pub accept_invalid_hostnames: bool,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: default_version(),
            max_version: default_version(),
            accept_invalid_certs: true,
            accept_invalid_hostnames: true,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_version() -> TlsVersion {
    TlsVersion::Tls10
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

impl TlsConfig {
    pub fn profile(&self) -> TransportProfile {
        TransportProfile {
            accept_invalid_certs: self.accept_invalid_certs,
            accept_invalid_hostnames: self.accept_invalid_hostnames,
            ..TransportProfile::pinned(
                self.min_version,
                self.max_version,
                Duration::from_secs(self.timeout_secs),
            )
        }
    }

    /// Label reported in results, e.g. `TLSv1.0` or `TLSv1.0-TLSv1.2`
    pub fn version_label(&self) -> String {
        if self.min_version == self.max_version {
            self.min_version.to_string()
        } else {
            format!("{}-{}", self.min_version, self.max_version)
        }
    }
}

fn headline(error_type: ErrorType) -> &'static str {
    match error_type {
        ErrorType::Protocol => "TLS/SSL handshake failed",
        ErrorType::Transport => "Connection failed",
        ErrorType::Timeout => "Request timed out",
        ErrorType::Configuration => "TLS client configuration rejected",
        _ => "Request failed",
    }
}

/// Run the downgraded-TLS simulator against `target`
pub async fn run(config: &TlsConfig, target: Option<&str>) -> FaultResult {
    let Some(url) = configured(target) else {
        return missing_target(FaultKind::BadTls);
    };
    let version = config.version_label();

    tracing::info!(url, tls_version = %version, "Starting outdated TLS request");

    let failed = |error_type: ErrorType, details: String| {
        tracing::warn!(url, error_type = %error_type, details = %details, "Outdated TLS request failed");
        FaultResult::failure(FaultKind::BadTls, error_type, headline(error_type))
            .with_metric("url", url)
            .with_metric("tls_version", version.clone())
            .with_metric("details", details)
    };

    let client = match config.profile().build_client() {
        Ok(client) => client,
        Err(e) => return failed(ErrorType::Configuration, describe(&e)),
    };

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return failed(classify(&e), describe(&e)),
    };

    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return failed(classify(&e), describe(&e)),
    };

    tracing::warn!(url, status, "Outdated TLS request unexpectedly succeeded");

    FaultResult::success(
        FaultKind::BadTls,
        format!("Request with {} unexpectedly succeeded", version),
    )
    .with_metric("url", url)
    .with_metric("status_code", status)
    .with_metric("tls_version", version.clone())
    .with_metric("response_size", body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MetricValue, Outcome};
    use crate::simulate::not_tls_listener;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_unset_target_is_configuration_error() {
        for target in [None, Some(""), Some("   ")] {
            let result = run(&TlsConfig::default(), target).await;

            assert_eq!(result.error_type, Some(ErrorType::Configuration));
            assert_eq!(result.outcome, Outcome::Fatal);
            assert_eq!(result.status_code(), 500);
            assert_eq!(result.metric("url"), Some(&MetricValue::Null));
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let result = run(&TlsConfig::default(), Some("https://127.0.0.1:1/")).await;

        assert_eq!(result.error_type, Some(ErrorType::Transport));
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.message, "Connection failed");
        assert_eq!(
            result.metric("tls_version"),
            Some(&MetricValue::Text("TLSv1.0".to_string()))
        );
    }

    #[tokio::test]
    async fn test_plain_http_target_succeeds() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_body_string("legacy"))
            .mount(&server)
            .await;

        let result = run(&TlsConfig::default(), Some(&server.uri())).await;

        assert_eq!(result.error_type, None);
        assert_eq!(result.status_code(), 200);
        assert_eq!(result.message, "Request with TLSv1.0 unexpectedly succeeded");
        assert_eq!(
            result.metric("url"),
            Some(&MetricValue::Text(server.uri()))
        );
        assert_eq!(result.metric("status_code"), Some(&MetricValue::Count(200)));
        assert_eq!(result.metric("response_size"), Some(&MetricValue::Count(6)));
    }

    #[tokio::test]
    async fn test_unsupported_version_is_configuration_error() {
        let config = TlsConfig {
            max_version: TlsVersion::Tls13,
            ..Default::default()
        };

        let result = run(&config, Some("https://127.0.0.1:1/")).await;

        assert_eq!(result.error_type, Some(ErrorType::Configuration));
        assert_eq!(result.outcome, Outcome::Fatal);
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.message, "TLS client configuration rejected");
        match result.metric("details") {
            Some(MetricValue::Text(details)) => {
                assert!(details.starts_with("failed to build HTTP client"))
            }
            other => panic!("details missing: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_handshake_is_protocol_error() {
        let target = not_tls_listener().await;
        let config = TlsConfig {
            timeout_secs: 5,
            ..Default::default()
        };

        let result = run(&config, Some(&target)).await;

        assert_eq!(result.error_type, Some(ErrorType::Protocol));
        assert_eq!(result.outcome, Outcome::PartialFailure);
        assert_eq!(result.message, "TLS/SSL handshake failed");
    }

    #[test]
    fn test_profile_follows_config() {
        let config = TlsConfig {
            max_version: TlsVersion::Tls12,
            accept_invalid_hostnames: false,
            ..Default::default()
        };
        let profile = config.profile();

        assert_eq!(profile.min_tls, Some(TlsVersion::Tls10));
        assert_eq!(profile.max_tls, Some(TlsVersion::Tls12));
        assert!(profile.accept_invalid_certs);
        assert!(!profile.accept_invalid_hostnames);
        assert_eq!(profile.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_version_label() {
        let mut config = TlsConfig::default();
        assert_eq!(config.version_label(), "TLSv1.0");
        config.max_version = TlsVersion::Tls12;
        assert_eq!(config.version_label(), "TLSv1.0-TLSv1.2");
    }
}
