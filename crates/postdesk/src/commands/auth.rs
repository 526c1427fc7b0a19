//! Login, logout and whoami.

use dialoguer::Input;
use secrecy::SecretString;

use postdesk_config::ConfigError;
use postdesk_core::{CoreError, Credentials, Dashboard, TokenStore, UserIdentity};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

fn detail(user: &UserIdentity) -> String {
    let mut lines = vec![
        format!("ID:       {}", user.id),
        format!("Username: {}", user.username),
        format!("Email:    {}", user.email),
        format!(
            "Role:     {}",
            if user.is_staff == Some(true) { "admin" } else { "user" }
        ),
    ];
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        lines.push(format!("Bio:      {bio}"));
    }
    if let Some(joined) = user.date_joined {
        lines.push(format!("Joined:   {}", joined.format("%Y-%m-%d")));
    }
    lines.join("\n")
}

/// Email from the flag or profile, else prompt. Password from env,
/// keyring or profile, else prompt.
fn gather_credentials(args: LoginArgs, global: &GlobalOpts) -> Result<(String, Credentials), CliError> {
    let cfg = config::load_config_or_default();
    let (profile_name, profile) = config::select_profile(global, &cfg)?;

    let email = match args.email.or_else(|| profile.email.clone()) {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };

    let password = match postdesk_config::resolve_password(&profile, &profile_name) {
        Ok(secret) => secret,
        Err(ConfigError::NoCredentials { .. }) => {
            SecretString::from(rpassword::prompt_password("Password: ").map_err(prompt_err)?)
        }
        Err(e) => return Err(e.into()),
    };

    Ok((profile_name, Credentials::new(email, password)))
}

/// Shown after a login whose tokens only live in memory.
fn persistence_warning(tokens: &dyn TokenStore) -> Option<&'static str> {
    tokens.persist_failed().then_some(
        "⚠ Tokens could not be saved to the system keyring; \
         later commands will need to log in again",
    )
}

pub async fn login(dashboard: &Dashboard, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile_name, credentials) = gather_credentials(args, global)?;

    let user = dashboard
        .auth()
        .login(&credentials)
        .await
        .map_err(|e| match e {
            CoreError::InvalidCredentials => CliError::AuthFailed {
                profile: profile_name.clone(),
            },
            other => other.into(),
        })?;

    if !global.quiet {
        eprintln!("✓ Logged in as {} ({})", user.username, user.email);
    }
    if let Some(warning) = persistence_warning(dashboard.session().tokens().as_ref()) {
        eprintln!("{warning}");
    }
    Ok(())
}

pub fn logout(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let was_logged_in = dashboard.session().is_authenticated();
    dashboard.logout();
    if !global.quiet {
        if was_logged_in {
            eprintln!("✓ Logged out");
        } else {
            eprintln!("Not logged in");
        }
    }
    Ok(())
}

/// Fetch the identity fresh and store it in the session.
pub async fn whoami(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(dashboard)?;

    let user = dashboard
        .client()
        .current_user()
        .await
        .map_err(CoreError::from)?;
    dashboard.session().set_user(Some(user.clone()));

    let out = output::render_single(&global.output, &user, detail, |u| u.email.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_shows_role_and_skips_empty_bio() {
        let user = UserIdentity {
            id: 1,
            email: "a@b.com".into(),
            username: "alice".into(),
            is_staff: Some(true),
            bio: Some(String::new()),
            date_joined: None,
        };
        let text = detail(&user);
        assert!(text.contains("Role:     admin"));
        assert!(!text.contains("Bio:"));
    }

    /// Keeps tokens in memory and reports every write as lost.
    struct VolatileTokens(postdesk_core::MemoryTokenStore);

    impl TokenStore for VolatileTokens {
        fn get(&self, slot: postdesk_core::TokenSlot) -> Option<SecretString> {
            self.0.get(slot)
        }
        fn set(&self, slot: postdesk_core::TokenSlot, value: SecretString) {
            self.0.set(slot, value);
        }
        fn remove(&self, slot: postdesk_core::TokenSlot) {
            self.0.remove(slot);
        }
        fn persist_failed(&self) -> bool {
            true
        }
    }

    #[test]
    fn login_warns_only_when_tokens_were_not_persisted() {
        assert!(persistence_warning(&postdesk_core::MemoryTokenStore::new()).is_none());

        let warning = persistence_warning(&VolatileTokens(postdesk_core::MemoryTokenStore::new()));
        assert!(warning.unwrap().contains("keyring"));
    }
}
