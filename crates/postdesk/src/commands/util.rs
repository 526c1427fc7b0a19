//! Shared helpers for command handlers.

use tokio::sync::broadcast;

use postdesk_core::{Dashboard, Notification, NotificationLevel};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Map a dialoguer / rpassword failure into `CliError`.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Fail fast when no session was restored, instead of letting the API
/// answer 401 and bounce to the login page.
pub fn require_login(dashboard: &Dashboard) -> Result<(), CliError> {
    if dashboard.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

/// Print queued notifications to stderr.
///
/// Errors are always shown; successes are dropped under `--quiet`.
pub fn drain_notifications(rx: &mut broadcast::Receiver<Notification>, quiet: bool) {
    while let Ok(note) = rx.try_recv() {
        match note.level {
            NotificationLevel::Success if !quiet => eprintln!("✓ {}", note.message),
            NotificationLevel::Success => {}
            NotificationLevel::Error => eprintln!("✗ {}", note.message),
        }
    }
}
