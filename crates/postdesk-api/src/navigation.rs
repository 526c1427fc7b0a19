// Client-side navigation hook
//
// When a token refresh fails the client must send the user back to the
// login entry point. The client does not own routing, so it calls out
// through this trait; `postdesk-core`'s router implements it.

use std::sync::{Mutex, PoisonError};

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Receiver of forced client-side navigations.
pub trait Navigator: Send + Sync {
    /// Replace the current location with `path`.
    fn navigate(&self, path: &str);
}

/// Navigator that ignores every request (the portal has no login).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}

/// Navigator that remembers every path it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path navigated to, oldest first.
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
