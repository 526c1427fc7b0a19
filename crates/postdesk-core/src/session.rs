// ── Session store ──
//
// Single source of truth for who is logged in. Tokens are written to the
// `TokenStore` slots; identity and UI preferences are mirrored into the
// persisted `app-storage` record on every change. Consumers observe the
// state through a `watch` channel.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use postdesk_api::{TokenSlot, TokenStore, UserIdentity};

use crate::persist::{PersistedState, SnapshotStore, Theme};

/// Observable session state.
///
/// Invariant: `is_authenticated == user.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserIdentity>,
    pub is_authenticated: bool,
    pub sidebar_collapsed: bool,
    pub theme: Theme,
}

impl SessionState {
    fn persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            sidebar_collapsed: self.sidebar_collapsed,
            theme: self.theme,
        }
    }
}

impl From<PersistedState> for SessionState {
    fn from(p: PersistedState) -> Self {
        // Recompute rather than trust the stored flag.
        let is_authenticated = p.user.is_some();
        Self {
            user: p.user,
            is_authenticated,
            sidebar_collapsed: p.sidebar_collapsed,
            theme: p.theme,
        }
    }
}

/// Lifecycle-scoped session, injected into whatever issues HTTP calls.
pub struct Session {
    tokens: Arc<dyn TokenStore>,
    snapshots: Arc<dyn SnapshotStore>,
    state: watch::Sender<SessionState>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start with an empty session.
    pub fn new(tokens: Arc<dyn TokenStore>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            tokens,
            snapshots,
            state,
        }
    }

    /// Rehydrate from the persisted record. A missing or unreadable
    /// record yields an empty session.
    pub fn restore(tokens: Arc<dyn TokenStore>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        let initial = match snapshots.load() {
            Ok(Some(persisted)) => SessionState::from(persisted),
            Ok(None) => SessionState::default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session record");
                SessionState::default()
            }
        };
        debug!(authenticated = initial.is_authenticated, "session restored");
        let (state, _) = watch::channel(initial);
        Self {
            tokens,
            snapshots,
            state,
        }
    }

    // ── Auth actions ─────────────────────────────────────────────────

    /// Store both tokens and the user. Tokens are not validated; the
    /// caller got them from a successful token exchange.
    pub fn login(&self, access: SecretString, refresh: SecretString, user: UserIdentity) {
        info!(user = %user.username, "logged in");
        self.tokens.set(TokenSlot::Access, access);
        self.tokens.set(TokenSlot::Refresh, refresh);
        self.update(|s| {
            s.user = Some(user);
            s.is_authenticated = true;
        });
    }

    /// Drop both tokens and the user. Safe to call when logged out.
    pub fn logout(&self) {
        debug!("logging out");
        self.tokens.clear();
        self.update(|s| {
            s.user = None;
            s.is_authenticated = false;
        });
    }

    /// Replace the identity; authentication follows user presence.
    pub fn set_user(&self, user: Option<UserIdentity>) {
        self.update(|s| {
            s.is_authenticated = user.is_some();
            s.user = user;
        });
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// `true` iff the current user is staff. Never an error.
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .user
            .as_ref()
            .and_then(|u| u.is_staff)
            .unwrap_or(false)
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.tokens.access_token()
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.tokens.refresh_token()
    }

    /// The durable token slots shared with the HTTP client.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribe to every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // ── UI preferences ───────────────────────────────────────────────

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.borrow().sidebar_collapsed
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    pub fn toggle_sidebar(&self) {
        self.update(|s| s.sidebar_collapsed = !s.sidebar_collapsed);
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.update(|s| s.sidebar_collapsed = collapsed);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|s| s.theme = theme);
    }

    pub fn toggle_theme(&self) {
        self.update(|s| s.theme = s.theme.toggled());
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Apply a change, notify subscribers, write the record through.
    fn update(&self, change: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(change);
        let persisted = self.state.borrow().persisted();
        if let Err(e) = self.snapshots.save(&persisted) {
            warn!(error = %e, "failed to persist session record");
        }
    }
}
