//! Slow-endpoint simulator
//!
//! Issues one GET against the slow sub-path of the configured target with a
//! generous timeout and judges the outcome on both status and latency.

use super::{classify, configured, describe, missing_target, seconds};
use crate::error::ErrorType;
use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Slow-call tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowCallConfig {
    /// Sub-path appended to the target URL
    #[serde(default = "default_path")]
    pub path: String,

    /// Client timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Latency above which a successful response still counts as an error
    #[serde(default = "default_threshold")]
    pub threshold_secs: u64,

    /// Millisecond override of `timeout_secs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Millisecond override of `threshold_secs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_ms: Option<u64>,
}

impl Default for SlowCallConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            timeout_secs: default_timeout(),
            threshold_secs: default_threshold(),
            timeout_ms: None,
            threshold_ms: None,
        }
    }
}

fn default_path() -> String {
    "slowapi".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_threshold() -> u64 {
    60
}

impl SlowCallConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn threshold(&self) -> Duration {
        self.threshold_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(self.threshold_secs))
    }

    /// The slow URL derived from the base target
    pub fn slow_url(&self, base: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Run the slow-call simulator against `target`
pub async fn run(config: &SlowCallConfig, target: Option<&str>) -> FaultResult {
    let Some(base) = configured(target) else {
        return missing_target(FaultKind::SlowCall);
    };
    let url = config.slow_url(base);
    let timeout = config.timeout();
    let threshold = config.threshold();

    tracing::info!(url = %url, timeout_ms = timeout.as_millis() as u64, "Starting slow call");

    let failed = |error_type: ErrorType, error: String, details: String| {
        tracing::warn!(url = %url, error_type = %error_type, details = %details, "Slow call failed");
        FaultResult::failure(FaultKind::SlowCall, error_type, error)
            .with_metric("url", url.clone())
            .with_metric("details", details)
    };

    let transport_failure = |e: reqwest::Error, elapsed: Duration| {
        let error_type = classify(&e);
        let details = format!("{} (after {:.2}s)", describe(&e), elapsed.as_secs_f64());
        match error_type {
            ErrorType::Timeout => failed(
                error_type,
                format!("Request timed out after {}s", seconds(timeout)),
                details,
            )
            .with_metric("timeout_seconds", seconds(timeout)),
            ErrorType::Transport | ErrorType::Protocol => {
                failed(error_type, "Connection to target failed".to_string(), details)
            }
            _ => failed(error_type, "Request to target failed".to_string(), details),
        }
    };

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return failed(ErrorType::Internal, "HTTP client unavailable".to_string(), describe(&e)),
    };

    let started = Instant::now();
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => return transport_failure(e, started.elapsed()),
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return transport_failure(e, started.elapsed()),
    };
    let elapsed = started.elapsed();
    let response_time = seconds(elapsed);

    if status.as_u16() >= 400 {
        return failed(
            ErrorType::Http,
            format!("Target responded with HTTP {}", status.as_u16()),
            format!("{} after {:.2}s", status, elapsed.as_secs_f64()),
        )
        .with_metric("status_code", status.as_u16())
        .with_metric("response_time_seconds", response_time);
    }

    if elapsed > threshold {
        return failed(
            ErrorType::LatencyThresholdExceeded,
            format!(
                "Response time exceeded {}s threshold",
                seconds(threshold)
            ),
            format!(
                "HTTP {} received after {:.2}s",
                status.as_u16(),
                elapsed.as_secs_f64()
            ),
        )
        .with_metric("status_code", status.as_u16())
        .with_metric("response_time_seconds", response_time);
    }

    tracing::info!(url = %url, status = status.as_u16(), response_time, "Slow call completed");

    FaultResult::success(FaultKind::SlowCall, "Slow call completed successfully")
        .with_metric("url", url.clone())
        .with_metric("status_code", status.as_u16())
        .with_metric("response_time_seconds", response_time)
        .with_metric("response_size", body.len())
        .with_metric("content_type", content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MetricValue, Outcome};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config(threshold_ms: u64, timeout_ms: u64) -> SlowCallConfig {
        SlowCallConfig {
            threshold_ms: Some(threshold_ms),
            timeout_ms: Some(timeout_ms),
            ..Default::default()
        }
    }

    async fn server_with(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slowapi"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_slow_url_joins_cleanly() {
        let config = SlowCallConfig::default();
        assert_eq!(config.slow_url("http://api.local"), "http://api.local/slowapi");
        assert_eq!(config.slow_url("http://api.local/"), "http://api.local/slowapi");
        assert_eq!(config.slow_url("http://api.local/v1/"), "http://api.local/v1/slowapi");
    }

    #[test]
    fn test_defaults() {
        let config = SlowCallConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.threshold(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_unset_target_is_configuration_error() {
        let result = run(&SlowCallConfig::default(), None).await;
        assert_eq!(result.error_type, Some(ErrorType::Configuration));
        assert_eq!(result.status_code(), 500);
    }

    #[tokio::test]
    async fn test_fast_success() {
        let server = server_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"message":"OK"}"#, "application/json"),
        )
        .await;

        let result = run(&fast_config(2_000, 5_000), Some(&server.uri())).await;

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.status_code(), 200);
        assert_eq!(result.metric("status_code"), Some(&MetricValue::Count(200)));
        assert_eq!(result.metric("response_size"), Some(&MetricValue::Count(16)));
        assert_eq!(
            result.metric("content_type"),
            Some(&MetricValue::Text("application/json".to_string()))
        );
        assert_eq!(
            result.metric("url"),
            Some(&MetricValue::Text(format!("{}/slowapi", server.uri())))
        );
    }

    #[tokio::test]
    async fn test_latency_over_threshold_is_error_despite_200() {
        let server = server_with(
            ResponseTemplate::new(200).set_delay(Duration::from_millis(700)),
        )
        .await;

        let result = run(&fast_config(300, 5_000), Some(&server.uri())).await;

        assert_eq!(result.error_type, Some(ErrorType::LatencyThresholdExceeded));
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.metric("status_code"), Some(&MetricValue::Count(200)));
        assert!(result.message.starts_with("Response time exceeded"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = server_with(ResponseTemplate::new(502)).await;

        let result = run(&fast_config(2_000, 5_000), Some(&server.uri())).await;

        assert_eq!(result.error_type, Some(ErrorType::Http));
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.metric("status_code"), Some(&MetricValue::Count(502)));
    }

    #[tokio::test]
    async fn test_client_timeout_reports_timeout_seconds() {
        let server = server_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
        )
        .await;

        let result = run(&fast_config(100, 500), Some(&server.uri())).await;

        assert_eq!(result.error_type, Some(ErrorType::Timeout));
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.metric("timeout_seconds"), Some(&MetricValue::Float(0.5)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let result = run(&fast_config(100, 1_000), Some("http://127.0.0.1:1")).await;
        assert_eq!(result.error_type, Some(ErrorType::Transport));
    }
}
