//! Outbound transport settings
//!
//! Protocol pinning and certificate policy are plain values handed to the
//! client builder rather than a custom connector type.

use crate::error::ClientBuildError;
use reqwest::tls;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// TLS protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "1.0")]
    Tls10,
    #[serde(rename = "1.1")]
    Tls11,
    #[serde(rename = "1.2")]
    Tls12,
    #[serde(rename = "1.3")]
    Tls13,
}

impl TlsVersion {
    fn to_reqwest(self) -> tls::Version {
        match self {
            TlsVersion::Tls10 => tls::Version::TLS_1_0,
            TlsVersion::Tls11 => tls::Version::TLS_1_1,
            TlsVersion::Tls12 => tls::Version::TLS_1_2,
            TlsVersion::Tls13 => tls::Version::TLS_1_3,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TlsVersion::Tls10 => "TLSv1.0",
            TlsVersion::Tls11 => "TLSv1.1",
            TlsVersion::Tls12 => "TLSv1.2",
            TlsVersion::Tls13 => "TLSv1.3",
        };
        f.write_str(label)
    }
}

/// Everything the outbound client needs to know about the connection
#[derive(Debug, Clone, PartialEq)]
pub struct TransportProfile {
    pub min_tls: Option<TlsVersion>,
    pub max_tls: Option<TlsVersion>,
    pub accept_invalid_certs: bool,
    pub accept_invalid_hostnames: bool,
    pub timeout: Duration,
    /// Keep idle connections for reuse
    pub reuse_connections: bool,
}

impl TransportProfile {
    /// Default TLS settings, fresh connection per client
    pub fn standard(timeout: Duration) -> Self {
        Self {
            min_tls: None,
            max_tls: None,
            accept_invalid_certs: false,
            accept_invalid_hostnames: false,
            timeout,
            reuse_connections: true,
        }
    }

    /// Negotiation limited to `min..=max`, verification off
    pub fn pinned(min: TlsVersion, max: TlsVersion, timeout: Duration) -> Self {
        Self {
            min_tls: Some(min),
            max_tls: Some(max),
            accept_invalid_certs: true,
            accept_invalid_hostnames: true,
            ..Self::standard(timeout)
        }
    }

    /// Drop connections as soon as the response is consumed
    pub fn without_reuse(mut self) -> Self {
        self.reuse_connections = false;
        self
    }

    /// Build a client honouring this profile
    pub fn build_client(&self) -> Result<reqwest::Client, ClientBuildError> {
        let mut builder = reqwest::Client::builder()
            .use_native_tls()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .danger_accept_invalid_hostnames(self.accept_invalid_hostnames);

        if let Some(min) = self.min_tls {
            builder = builder.min_tls_version(min.to_reqwest());
        }
        if let Some(max) = self.max_tls {
            builder = builder.max_tls_version(max.to_reqwest());
        }
        if !self.reuse_connections {
            builder = builder.pool_max_idle_per_host(0);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_profile_disables_verification() {
        let profile = TransportProfile::pinned(TlsVersion::Tls10, TlsVersion::Tls10, Duration::from_secs(30));
        assert_eq!(profile.min_tls, Some(TlsVersion::Tls10));
        assert_eq!(profile.max_tls, Some(TlsVersion::Tls10));
        assert!(profile.accept_invalid_certs);
        assert!(profile.accept_invalid_hostnames);
        assert!(profile.reuse_connections);
    }

    #[test]
    fn test_without_reuse() {
        let profile = TransportProfile::standard(Duration::from_secs(10)).without_reuse();
        assert!(!profile.reuse_connections);
        assert!(profile.build_client().is_ok());
    }

    #[test]
    fn test_tls_version_serde_names() {
        let v: TlsVersion = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(v, TlsVersion::Tls10);
        assert_eq!(v.to_string(), "TLSv1.0");
        assert!(TlsVersion::Tls10 < TlsVersion::Tls13);
    }
}
