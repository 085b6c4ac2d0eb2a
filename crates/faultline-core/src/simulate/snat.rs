//! Connection-churn simulator
//!
//! Issues sequential GETs, each through a brand-new client whose connection
//! is dropped right after the call, to burn through outbound source ports.

use super::{classify, describe, TransportProfile};
use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SNAT simulator tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnatConfig {
    /// Host hit by every call
    #[serde(default = "default_target")]
    pub target: String,

    /// Number of sequential calls
    #[serde(default = "default_total_calls")]
    pub total_calls: usize,

    /// Per-call timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SnatConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            total_calls: default_total_calls(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_target() -> String {
    "https://www.bing.com".to_string()
}

fn default_total_calls() -> usize {
    500
}

fn default_timeout() -> u64 {
    10
}

/// Success/failure tally of one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallTally {
    pub successful: usize,
    pub failed: usize,
}

impl CallTally {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

/// One call through a fresh, non-reusing client. `true` only for HTTP 200.
async fn single_call(profile: &TransportProfile, target: &str, index: usize) -> bool {
    let client = match profile.build_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(call = index, error = %e, "Client construction failed");
            return false;
        }
    };

    let ok = match client.get(target).send().await {
        Ok(response) if response.status() == reqwest::StatusCode::OK => {
            tracing::debug!(call = index, "Request successful");
            true
        }
        Ok(response) => {
            tracing::warn!(call = index, status = response.status().as_u16(), "Request failed with status");
            false
        }
        Err(e) => {
            tracing::warn!(
                call = index,
                error_type = %classify(&e),
                error = %describe(&e),
                "Request failed"
            );
            false
        }
    };

    drop(client);
    ok
}

/// Run the connection-churn simulator. Per-call failures never stop the loop.
pub async fn run(config: &SnatConfig) -> FaultResult {
    tracing::info!(
        target = %config.target,
        total = config.total_calls,
        "Starting SNAT port exhaustion test"
    );

    let profile =
        TransportProfile::standard(Duration::from_secs(config.timeout_secs)).without_reuse();
    let mut tally = CallTally::default();

    for index in 1..=config.total_calls {
        if single_call(&profile, &config.target, index).await {
            tally.successful += 1;
        } else {
            tally.failed += 1;
        }
    }

    tracing::info!(
        successful = tally.successful,
        failed = tally.failed,
        "SNAT test completed"
    );

    FaultResult::success(
        FaultKind::Snat,
        format!("Completed {} requests to {}", config.total_calls, config.target),
    )
    .with_metric("successful_calls", tally.successful)
    .with_metric("failed_calls", tally.failed)
    .with_metric("total_calls", tally.total())
}
