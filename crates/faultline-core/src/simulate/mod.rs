//! External fault simulators
//!
//! Outbound calls made with deliberately broken parameters or against slow
//! endpoints. Every transport failure is classified into an [`ErrorType`]
//! instead of being propagated.

pub mod slow_call;
pub mod snat;
pub mod tls;
pub mod transport;

pub use slow_call::SlowCallConfig;
pub use snat::SnatConfig;
pub use tls::TlsConfig;
pub use transport::{TlsVersion, TransportProfile};

use crate::error::ErrorType;
use crate::result::{FaultKind, FaultResult};
use std::error::Error as StdError;
use std::time::Duration;

const TLS_MARKERS: [&str; 6] = ["ssl", "tls", "handshake", "certificate", "protocol version", "wrong version"];

/// Whether any error in the source chain comes from TLS negotiation
fn mentions_tls(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        if TLS_MARKERS.iter().any(|m| text.contains(m)) {
            return true;
        }
        current = e.source();
    }
    false
}

/// Map an outbound request error onto the failure taxonomy.
///
/// Only the source chain is inspected for TLS markers; the top-level message
/// embeds the request URL.
pub fn classify(err: &reqwest::Error) -> ErrorType {
    if err.is_timeout() {
        ErrorType::Timeout
    } else if err.source().is_some_and(mentions_tls) {
        ErrorType::Protocol
    } else if err.is_connect() {
        ErrorType::Transport
    } else {
        ErrorType::Request
    }
}

/// Full error text including its sources.
///
/// Some errors already print their cause; a source whose text is already
/// present is not repeated.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        let part = e.to_string();
        if !text.contains(&part) {
            text.push_str(": ");
            text.push_str(&part);
        }
        current = e.source();
    }
    text
}

/// Non-empty target URL, if configured
pub(crate) fn configured(target: Option<&str>) -> Option<&str> {
    target.map(str::trim).filter(|t| !t.is_empty())
}

/// Result returned when no target URL is configured
pub(crate) fn missing_target(kind: FaultKind) -> FaultResult {
    tracing::error!(fault = %kind, "Target URL is not configured");
    FaultResult::failure(kind, ErrorType::Configuration, "Target URL is not configured")
        .with_metric("url", None::<String>)
        .with_metric(
            "details",
            "Set FAULTLINE_TARGET_URL (or faults.target_url) to the endpoint under test",
        )
}

/// Seconds rounded to two decimals
pub(crate) fn seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100.0).round() / 100.0
}

/// Listener that answers a TLS client hello with plain HTTP
#[cfg(test)]
pub(crate) async fn not_tls_listener() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut hello = [0u8; 1024];
            let _ = socket.read(&mut hello).await;
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await;
        }
    });
    format!("https://{}/", addr)
}
