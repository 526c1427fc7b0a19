use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for the `postdesk-api` crate.
///
/// Covers every failure mode of both API surfaces: token exchange,
/// transport, and the dashboard/portal REST endpoints.
/// `postdesk-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API answered 401. When this comes back from `ApiClient` it is
    /// terminal: the single refresh-retry has already been spent (or was
    /// not possible).
    #[error("Unauthorized (HTTP 401): {message}")]
    Unauthorized { message: String },

    /// Token exchange failed (wrong credentials, inactive account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated but not allowed.
    #[error("Forbidden (HTTP 403): {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST ────────────────────────────────────────────────────────
    /// The requested resource does not exist.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for an HTTP 401 from a protected endpoint.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(StatusCode::NOT_FOUND),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }

    /// The HTTP status behind this error, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classify a non-success response into an error.
    ///
    /// DRF error bodies are `{"detail": "..."}`; when present the detail
    /// becomes the message, otherwise a truncated body preview is used.
    pub(crate) fn from_response(status: StatusCode, path: &str, body: String) -> Self {
        let message = detail_message(&body)
            .unwrap_or_else(|| body.chars().take(200).collect::<String>());
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { message },
            StatusCode::FORBIDDEN => Self::Forbidden { message },
            StatusCode::NOT_FOUND => Self::NotFound {
                path: path.to_owned(),
            },
            _ => Self::Api {
                status: status.as_u16(),
                message,
                body,
            },
        }
    }
}

fn detail_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: String,
    }
    serde_json::from_str::<Detail>(body).ok().map(|d| d.detail)
}
