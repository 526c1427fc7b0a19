// ── Runtime connection configuration ──
//
// These types describe *how* to reach the blog API. They carry no
// credentials and never touch disk. The CLI constructs an `ApiConfig`
// and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use postdesk_api::{DEFAULT_BASE_URL, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (local development servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to one API deployment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., `http://localhost:8000`).
    pub base_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Translate into the API crate's transport settings.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        // The constant is a valid URL; parse cannot fail.
        #[allow(clippy::expect_used)]
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        Self::new(base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_localhost() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn transport_mirrors_tls_choice() {
        let mut config = ApiConfig::default();
        config.tls = TlsVerification::DangerAcceptInvalid;
        assert!(matches!(
            config.transport().tls,
            TlsMode::DangerAcceptInvalid
        ));
    }
}
