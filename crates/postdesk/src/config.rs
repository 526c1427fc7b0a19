//! CLI configuration: `postdesk_config` plus `GlobalOpts` overrides.

use std::time::Duration;

use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use tracing::warn;

use postdesk_core::{ApiConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use postdesk_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Profile name from `--profile`, else the config default, else "default".
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// The profile the command runs against.
///
/// An explicitly requested profile must exist; otherwise a missing
/// profile falls back to the built-in defaults so a fresh install can
/// talk to a local API.
pub fn select_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_some() => Err(profile_not_found(name, config)),
        None => Ok((name, Profile::default())),
    }
}

pub fn profile_not_found(name: String, config: &Config) -> CliError {
    let mut available: Vec<_> = config.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Fill `--output` and `--color` from `[defaults]` when neither the flag
/// nor its environment variable was given.
pub fn apply_defaults(global: &mut GlobalOpts, matches: &ArgMatches, defaults: &Defaults) {
    if from_builtin_default(matches, "output") {
        if let Some(output) = parse_default::<OutputFormat>("output", &defaults.output) {
            global.output = output;
        }
    }
    if from_builtin_default(matches, "color") {
        if let Some(color) = parse_default::<ColorMode>("color", &defaults.color) {
            global.color = color;
        }
    }
}

fn from_builtin_default(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        None | Some(ValueSource::DefaultValue)
    )
}

fn parse_default<T: ValueEnum>(key: &str, raw: &str) -> Option<T> {
    T::from_str(raw, true)
        .map_err(|e| warn!(key, value = raw, error = %e, "ignoring invalid [defaults] value"))
        .ok()
}

/// Translate a profile into an `ApiConfig`. Flags win over the profile,
/// which wins over `[defaults]`.
pub fn resolve_api_config(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ApiConfig, CliError> {
    let mut config = postdesk_config::profile_to_api_config(profile, defaults)?;

    // --api-url is also fed by POSTDESK_API_BASE_URL through clap
    if let Some(ref raw) = global.api_url {
        config.base_url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{CommandFactory, FromArgMatches, Parser};

    use super::*;
    use crate::cli::Cli;

    fn argv<'a>(args: &[&'a str]) -> Vec<&'a str> {
        let mut argv = vec!["postdesk"];
        argv.extend_from_slice(args);
        argv.push("logout");
        argv
    }

    fn global(args: &[&str]) -> GlobalOpts {
        Cli::try_parse_from(argv(args)).unwrap().global
    }

    /// Parse `args` and layer `defaults` underneath, as `main` does.
    fn global_with_defaults(args: &[&str], defaults: &Defaults) -> GlobalOpts {
        let matches = Cli::command().try_get_matches_from(argv(args)).unwrap();
        let mut cli = Cli::from_arg_matches(&matches).unwrap();
        apply_defaults(&mut cli.global, &matches, defaults);
        cli.global
    }

    fn defaults(output: &str, color: &str) -> Defaults {
        Defaults {
            output: output.into(),
            color: color.into(),
            ..Defaults::default()
        }
    }

    #[test]
    fn defaults_section_applies_when_flags_absent() {
        let opts = global_with_defaults(&[], &defaults("json", "never"));
        assert!(matches!(opts.output, OutputFormat::Json));
        assert!(matches!(opts.color, ColorMode::Never));
    }

    #[test]
    fn flags_beat_defaults_section() {
        let opts = global_with_defaults(&["-o", "yaml", "--color", "always"], &defaults("json", "never"));
        assert!(matches!(opts.output, OutputFormat::Yaml));
        assert!(matches!(opts.color, ColorMode::Always));
    }

    #[test]
    fn invalid_defaults_value_keeps_builtin() {
        let opts = global_with_defaults(&[], &defaults("csv", "sometimes"));
        assert!(matches!(opts.output, OutputFormat::Table));
        assert!(matches!(opts.color, ColorMode::Auto));
    }

    #[test]
    fn profile_beats_defaults_section_for_timeout() {
        let section = Defaults {
            timeout: 90,
            insecure: true,
            ..Defaults::default()
        };
        let bare = resolve_api_config(&Profile::default(), &section, &global(&[])).unwrap();
        assert_eq!(bare.timeout, Duration::from_secs(90));
        assert_eq!(bare.tls, TlsVerification::DangerAcceptInvalid);

        let profile = Profile {
            timeout: Some(4),
            ..Profile::default()
        };
        let config = resolve_api_config(&profile, &section, &global(&[])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(4));
    }

    #[test]
    fn flags_override_profile() {
        let profile = Profile {
            api_base_url: "https://blog.example.com".into(),
            timeout: Some(5),
            ..Profile::default()
        };
        let opts = global(&["--api-url", "http://127.0.0.1:9000", "--timeout", "3", "-k"]);
        let config = resolve_api_config(&profile, &Defaults::default(), &opts).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn bad_url_flag_is_validation_error() {
        let opts = global(&["--api-url", "not a url"]);
        let err = resolve_api_config(&Profile::default(), &Defaults::default(), &opts).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn missing_explicit_profile_is_an_error() {
        let config = Config::default();
        let err = select_profile(&global(&["--profile", "prod"]), &config).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }));

        let (name, profile) = select_profile(&global(&[]), &config).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.api_base_url, "http://localhost:8000");
    }
}
