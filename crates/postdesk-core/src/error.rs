// ── Core error types ──
//
// User-facing errors from postdesk-core. These are NOT API-specific --
// consumers never see raw status codes or JSON parse failures directly.
// The `From<postdesk_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Auth errors ──────────────────────────────────────────────────
    /// Login failed. The cause is deliberately not distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The session expired and could not be refreshed.
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Scope errors ─────────────────────────────────────────────────
    /// A filter store was requested outside an active `FilterScope`.
    #[error("Post filter store accessed outside an active filter scope")]
    FilterScopeInactive,

    // ── Configuration / storage ──────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired { .. } | Self::NotAuthenticated | Self::InvalidCredentials
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<postdesk_api::Error> for CoreError {
    fn from(err: postdesk_api::Error) -> Self {
        use postdesk_api::Error as ApiError;

        match err {
            ApiError::Unauthorized { message } => CoreError::SessionExpired { message },
            ApiError::Authentication { .. } => CoreError::InvalidCredentials,
            ApiError::Forbidden { message } => CoreError::PermissionDenied { message },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::NotFound { path } => {
                let (entity_type, identifier) = entity_from_path(&path);
                CoreError::NotFound {
                    entity_type,
                    identifier,
                }
            }
            ApiError::Api {
                status: 400,
                message,
                ..
            } => CoreError::ValidationFailed { message },
            ApiError::Api {
                status, message, ..
            } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

/// `/api/v0/dashboard/posts/9/` -> `("post", "9")`. Paths that do not end
/// in a numeric id keep the whole path as the identifier.
fn entity_from_path(path: &str) -> (String, String) {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(id), Some(collection)) if id.parse::<i64>().is_ok() => (
            collection.strip_suffix('s').unwrap_or(collection).to_owned(),
            id.to_owned(),
        ),
        _ => ("resource".into(), path.to_owned()),
    }
}
