// Token slots backed by the system keyring.
//
// Each profile owns two entries, `{profile}/access_token` and
// `{profile}/refresh_token`, under the `postdesk` service. Values are
// cached in-process after the first read or write so the HTTP client can
// read them per request without a keyring round-trip.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{trace, warn};

use postdesk_api::{TokenSlot, TokenStore};

use crate::{KEYRING_SERVICE, keyring_account};

pub struct KeyringTokenStore {
    profile: String,
    cache: RwLock<HashMap<TokenSlot, Option<SecretString>>>,
    persist_failed: AtomicBool,
}

impl fmt::Debug for KeyringTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringTokenStore")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl KeyringTokenStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            cache: RwLock::new(HashMap::new()),
            persist_failed: AtomicBool::new(false),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    fn entry(&self, slot: TokenSlot) -> Option<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &keyring_account(&self.profile, slot.key()))
            .inspect_err(|e| warn!(%slot, error = %e, "keyring unavailable"))
            .ok()
    }

    fn record_write(&self, slot: TokenSlot, result: keyring::Result<()>) {
        if let Err(e) = result {
            warn!(%slot, error = %e, "failed to store token in keyring");
            self.persist_failed.store(true, Ordering::Release);
        }
    }

    fn cache_put(&self, slot: TokenSlot, value: Option<SecretString>) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, value);
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, slot: TokenSlot) -> Option<SecretString> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&slot)
        {
            return cached.clone();
        }

        let value = self
            .entry(slot)
            .and_then(|entry| entry.get_password().ok())
            .map(SecretString::from);
        trace!(%slot, present = value.is_some(), "read token slot");
        self.cache_put(slot, value.clone());
        value
    }

    fn set(&self, slot: TokenSlot, value: SecretString) {
        let result = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(&self.profile, slot.key()))
            .and_then(|entry| entry.set_password(value.expose_secret()));
        self.record_write(slot, result);
        self.cache_put(slot, Some(value));
    }

    fn persist_failed(&self) -> bool {
        self.persist_failed.load(Ordering::Acquire)
    }

    fn remove(&self, slot: TokenSlot) {
        if let Some(entry) = self.entry(slot) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(%slot, error = %e, "failed to remove token from keyring"),
            }
        }
        self.cache_put(slot, None);
    }
}
