//! Shared configuration for postdesk.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! durable token and session-record storage, and translation to
//! `postdesk_core::ApiConfig`. The CLI adds `GlobalOpts`-aware wrappers
//! on top.

mod snapshot;
mod tokens;

pub use snapshot::FileSnapshotStore;
pub use tokens::KeyringTokenStore;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use postdesk_core::{ApiConfig, TlsVerification};

/// Keyring service name shared by passwords and tokens.
pub const KEYRING_SERVICE: &str = "postdesk";

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "POSTDESK_";

/// Overrides every profile's `api_base_url`.
pub const ENV_API_BASE_URL: &str = "POSTDESK_API_BASE_URL";

/// Checked before the keyring and the profile's plaintext password.
pub const ENV_PASSWORD: &str = "POSTDESK_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named API deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "http://localhost:8000").
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Login email.
    pub email: Option<String>,

    /// Plaintext password; prefer the keyring.
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            email: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_api_base_url() -> String {
    postdesk_api::DEFAULT_BASE_URL.into()
}

impl Config {
    /// The profile to use: `requested`, else `default_profile`, else "default".
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "postdesk", "postdesk")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    for part in parts {
        p.push(part);
    }
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "postdesk", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session records.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "postdesk"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize to TOML, creating parent directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Keyring account name for a profile-scoped secret.
pub fn keyring_account(profile_name: &str, key: &str) -> String {
    format!("{profile_name}/{key}")
}

/// Resolve the login password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var(ENV_PASSWORD) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, "password"))
    {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, "password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `ApiConfig` from a profile. `POSTDESK_API_BASE_URL` wins
/// over the profile's URL; `insecure` and `timeout` fall back to the
/// `[defaults]` section when the profile leaves them unset.
pub fn profile_to_api_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ApiConfig, ConfigError> {
    let raw = std::env::var(ENV_API_BASE_URL).unwrap_or_else(|_| profile.api_base_url.clone());
    let base_url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ApiConfig {
        base_url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "staging".into(),
            Profile {
                api_base_url: "https://blog.example.com".into(),
                email: Some("a@b.com".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("staging".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_name(None), "staging");
        let profile = &loaded.profiles["staging"];
        assert_eq!(profile.email.as_deref(), Some("a@b.com"));
        assert_eq!(profile.timeout, Some(5));
    }

    #[test]
    fn profile_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profiles.local]\nemail = \"a@b.com\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.profiles["local"].api_base_url, "http://localhost:8000");
        assert_eq!(cfg.profile_name(Some("local")), "local");
    }

    #[test]
    fn profile_translates_tls_and_timeout() {
        let profile = Profile {
            api_base_url: "https://blog.example.com".into(),
            ca_cert: Some("/etc/ca.pem".into()),
            timeout: Some(7),
            ..Profile::default()
        };
        let config = profile_to_api_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.tls, TlsVerification::CustomCa("/etc/ca.pem".into()));

        let insecure = Profile {
            insecure: Some(true),
            ..profile
        };
        assert_eq!(
            profile_to_api_config(&insecure, &Defaults::default())
                .unwrap()
                .tls,
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn defaults_section_fills_unset_profile_fields() {
        let defaults = Defaults {
            insecure: true,
            timeout: 90,
            ..Defaults::default()
        };

        let bare = profile_to_api_config(&Profile::default(), &defaults).unwrap();
        assert_eq!(bare.timeout, Duration::from_secs(90));
        assert_eq!(bare.tls, TlsVerification::DangerAcceptInvalid);

        let explicit = Profile {
            insecure: Some(false),
            timeout: Some(5),
            ..Profile::default()
        };
        let config = profile_to_api_config(&explicit, &defaults).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn defaults_section_loads_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\noutput = \"json\"\ncolor = \"never\"\ntimeout = 12\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "never");
        assert_eq!(cfg.defaults.timeout, 12);
        assert!(!cfg.defaults.insecure);
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            password: Some("hunter2".into()),
            ..Profile::default()
        };
        // Env and keyring may be populated on a developer machine; only
        // assert that resolution succeeds.
        assert!(resolve_password(&profile, "postdesk-test-nonexistent").is_ok());
    }
}
