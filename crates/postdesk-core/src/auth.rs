// ── Login / logout flow ──
//
// Token exchange, identity fetch and session handoff. Every failure in
// the login sequence collapses into one generic error so the caller can
// never tell a wrong password from an unknown account.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use tracing::{info, warn};

use postdesk_api::{ApiClient, LOGIN_PATH, Navigator, TokenSlot, UserIdentity};

use crate::cache::QueryCache;
use crate::error::CoreError;
use crate::posts::PostPage;
use crate::router::POSTS_PATH;
use crate::session::Session;

/// Email + password pair submitted on the login form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Drives login and logout against a `Session`.
pub struct AuthFlow {
    client: Arc<ApiClient>,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    cache: Arc<QueryCache<PostPage>>,
    loading: AtomicBool,
    error: Mutex<Option<String>>,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("is_loading", &self.is_loading())
            .field("error", &self.error())
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
        cache: Arc<QueryCache<PostPage>>,
    ) -> Self {
        Self {
            client,
            session,
            navigator,
            cache,
            loading: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Message from the last failed login, cleared when a new one starts.
    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Exchange credentials, fetch the identity, hand both to the session
    /// and navigate to the post list. Pages cached under an earlier
    /// session are dropped first.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserIdentity, CoreError> {
        self.loading.store(true, Ordering::Release);
        self.set_error(None);

        let result = self.try_login(credentials).await;

        let outcome = match result {
            Ok(user) => {
                info!(user = %user.username, "login succeeded");
                if self.session.tokens().persist_failed() {
                    warn!("tokens were not persisted; the session ends with this process");
                }
                self.cache.clear();
                self.navigator.navigate(POSTS_PATH);
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.session.tokens().remove(TokenSlot::Access);
                let err = CoreError::InvalidCredentials;
                self.set_error(Some(err.to_string()));
                Err(err)
            }
        };
        self.loading.store(false, Ordering::Release);
        outcome
    }

    /// End the session and go back to the login page.
    pub fn logout(&self) {
        self.session.logout();
        self.navigator.navigate(LOGIN_PATH);
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<UserIdentity, postdesk_api::Error> {
        let pair = self
            .client
            .obtain_token_pair(&credentials.email, &credentials.password)
            .await?;

        // `/users/me/` needs a bearer token before the session exists.
        let access = SecretString::from(pair.access);
        self.session
            .tokens()
            .set(TokenSlot::Access, access.clone());

        let user = self.client.current_user().await?;
        self.session
            .login(access, SecretString::from(pair.refresh), user.clone());
        Ok(user)
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }
}
