//! Command dispatch: CLI args -> dashboard operations -> output formatting.

pub mod auth;
pub mod comments;
pub mod config_cmd;
pub mod portal;
pub mod posts;
pub mod prefs;
pub mod util;

use postdesk_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(dashboard, args, global).await,
        Command::Logout => auth::logout(dashboard, global),
        Command::Whoami => auth::whoami(dashboard, global).await,
        Command::Posts(args) => posts::handle(dashboard, args, global).await,
        Command::Comments(args) => comments::handle(dashboard, args, global).await,
        Command::Portal(args) => portal::handle(dashboard, args, global).await,
        Command::Prefs(args) => prefs::handle(dashboard, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
