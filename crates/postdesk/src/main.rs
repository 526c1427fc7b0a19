mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use postdesk_config::{Config, FileSnapshotStore, KeyringTokenStore};
use postdesk_core::Dashboard;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let mut cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.format(&mut Cli::command()).exit(),
    };

    init_tracing(cli.global.verbose);

    let cfg = config::load_config_or_default();
    config::apply_defaults(&mut cli.global, &matches, &cfg.defaults);

    if let Err(err) = run(cli, &cfg).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, cfg: &Config) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "postdesk", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let dashboard = build_dashboard(&cli.global, cfg)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &dashboard, &cli.global).await
        }
    }
}

/// Restore the profile's session and wire the dashboard against its API.
fn build_dashboard(global: &GlobalOpts, cfg: &Config) -> Result<Dashboard, CliError> {
    let (profile_name, profile) = config::select_profile(global, cfg)?;
    let api_config = config::resolve_api_config(&profile, &cfg.defaults, global)?;

    tracing::debug!(profile = %profile_name, base_url = %api_config.base_url, "using profile");
    let tokens = Arc::new(KeyringTokenStore::new(profile_name.as_str()));
    let snapshots = Arc::new(FileSnapshotStore::for_profile(&profile_name));
    Ok(Dashboard::new(api_config, tokens, snapshots)?)
}
