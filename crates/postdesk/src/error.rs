//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use postdesk_config::ConfigError;
use postdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the API at {url}")]
    #[diagnostic(
        code(postdesk::connection_failed),
        help(
            "Check that the API server is running and reachable.\n\
             Override the URL with --api-url or POSTDESK_API_BASE_URL."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(postdesk::timeout),
        help("Increase the timeout with --timeout or check the server.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Invalid email or password")]
    #[diagnostic(
        code(postdesk::auth_failed),
        help("Check your credentials, or store them with: postdesk config set-password --profile {profile}")
    )]
    AuthFailed { profile: String },

    #[error("Not logged in")]
    #[diagnostic(code(postdesk::not_logged_in), help("Run: postdesk login"))]
    NotLoggedIn,

    #[error("Session expired")]
    #[diagnostic(
        code(postdesk::session_expired),
        help("The refresh token was rejected. Run: postdesk login")
    )]
    SessionExpired,

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(postdesk::no_credentials),
        help(
            "Store one with: postdesk config set-password\n\
             Or set the POSTDESK_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(code(postdesk::permission_denied))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(postdesk::not_found),
        help("Run: postdesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(postdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(postdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(postdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: postdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(postdesk::config))]
    Config(Box<figment::Error>),

    #[error("Session storage error: {message}")]
    #[diagnostic(code(postdesk::storage))]
    Storage { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(postdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot encode output as JSON: {0}")]
    #[diagnostic(code(postdesk::json))]
    Json(#[from] serde_json::Error),

    #[error("Cannot encode output as YAML: {0}")]
    #[diagnostic(code(postdesk::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(postdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NotLoggedIn
            | Self::SessionExpired
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::InvalidCredentials => CliError::AuthFailed {
                profile: "current".into(),
            },
            CoreError::SessionExpired { .. } => CliError::SessionExpired,
            CoreError::NotAuthenticated => CliError::NotLoggedIn,
            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError { status, message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Storage { message } => CliError::Storage { message },
            CoreError::FilterScopeInactive => {
                CliError::Internal("post filters used before the list was opened".into())
            }
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_exit_with_auth_code() {
        let err = CliError::from(CoreError::InvalidCredentials);
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(CoreError::NotAuthenticated).exit_code(), exit_code::AUTH);
        assert_eq!(
            CliError::from(CoreError::SessionExpired {
                message: "expired".into()
            })
            .exit_code(),
            exit_code::AUTH
        );
    }

    #[test]
    fn not_found_suggests_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "post".into(),
            identifier: "9".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "post '9' not found");
    }

    #[test]
    fn api_error_mentions_status() {
        let err = CliError::ApiError {
            status: Some(500),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
