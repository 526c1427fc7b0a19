// Durable token slots
//
// The access and refresh tokens live in two named slots outside the
// persisted session record. Everything that reads or writes them goes
// through `TokenStore`, so the HTTP client never touches ambient storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

/// One of the two durable token slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    Access,
    Refresh,
}

impl TokenSlot {
    /// Storage key for this slot.
    pub fn key(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Narrow read/write interface over durable token storage.
///
/// Writes are synchronous single-slot overwrites with no confirmation
/// step. Implementations that can fail (keyring, disk) log the failure
/// and carry on, so callers see the same semantics as browser storage.
pub trait TokenStore: Send + Sync {
    fn get(&self, slot: TokenSlot) -> Option<SecretString>;
    fn set(&self, slot: TokenSlot, value: SecretString);
    fn remove(&self, slot: TokenSlot);

    fn access_token(&self) -> Option<SecretString> {
        self.get(TokenSlot::Access)
    }

    fn refresh_token(&self) -> Option<SecretString> {
        self.get(TokenSlot::Refresh)
    }

    fn set_access_token(&self, token: SecretString) {
        self.set(TokenSlot::Access, token);
    }

    /// Remove both slots.
    fn clear(&self) {
        self.remove(TokenSlot::Access);
        self.remove(TokenSlot::Refresh);
    }

    /// True once a `set` could not reach durable storage. The value is
    /// still readable in this process but a later one will not see it.
    fn persist_failed(&self) -> bool {
        false
    }
}

/// Process-local token storage. Used by tests and by the portal, which
/// never authenticates.
#[derive(Default)]
pub struct MemoryTokenStore {
    slots: RwLock<HashMap<TokenSlot, SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed both slots at construction.
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        store.set(TokenSlot::Access, SecretString::from(access.to_owned()));
        store.set(TokenSlot::Refresh, SecretString::from(refresh.to_owned()));
        store
    }
}

impl fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemoryTokenStore")
            .field("access", &slots.contains_key(&TokenSlot::Access))
            .field("refresh", &slots.contains_key(&TokenSlot::Refresh))
            .finish()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, slot: TokenSlot) -> Option<SecretString> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&slot)
            .cloned()
    }

    fn set(&self, slot: TokenSlot, value: SecretString) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, value);
    }

    fn remove(&self, slot: TokenSlot) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&slot);
    }
}

/// Compare two optional tokens without leaking either into logs.
pub(crate) fn same_token(a: Option<&SecretString>, b: Option<&SecretString>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clear_removes_both_slots() {
        let store = MemoryTokenStore::with_tokens("a", "r");
        assert!(store.access_token().is_some());
        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        // idempotent
        store.clear();
    }

    #[test]
    fn overwrite_replaces_access_only() {
        let store = MemoryTokenStore::with_tokens("old", "r");
        store.set_access_token(SecretString::from("new".to_owned()));
        assert_eq!(store.access_token().unwrap().expose_secret(), "new");
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "r");
    }

    #[test]
    fn debug_does_not_print_tokens() {
        let store = MemoryTokenStore::with_tokens("very-secret", "r");
        let out = format!("{store:?}");
        assert!(!out.contains("very-secret"));
    }

    #[test]
    fn same_token_compares_values() {
        let a = SecretString::from("x".to_owned());
        let b = SecretString::from("x".to_owned());
        let c = SecretString::from("y".to_owned());
        assert!(same_token(Some(&a), Some(&b)));
        assert!(!same_token(Some(&a), Some(&c)));
        assert!(!same_token(Some(&a), None));
        assert!(same_token(None, None));
    }
}
