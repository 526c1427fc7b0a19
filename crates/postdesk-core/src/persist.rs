// ── Persisted session record ──
//
// The subset of session state that survives a restart: who is logged in
// plus UI preferences. Tokens are NOT part of this record; they live in
// the `TokenStore` slots.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use postdesk_api::UserIdentity;

use crate::error::CoreError;

/// Name of the durable record.
pub const STORAGE_NAME: &str = "app-storage";

/// Record schema version. Bump when `PersistedState` changes shape.
pub const STORAGE_VERSION: u32 = 0;

/// Colour theme preference.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// What gets written to the `app-storage` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub sidebar_collapsed: bool,
    #[serde(default)]
    pub theme: Theme,
}

/// On-disk envelope: `{ "state": {...}, "version": 0 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

impl From<PersistedState> for PersistedRecord {
    fn from(state: PersistedState) -> Self {
        Self {
            state,
            version: STORAGE_VERSION,
        }
    }
}

/// Durable home of the persisted record.
pub trait SnapshotStore: Send + Sync {
    /// Load the record, `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<PersistedState>, CoreError>;
    /// Overwrite the record.
    fn save(&self, state: &PersistedState) -> Result<(), CoreError>;
}

/// In-memory record. Survives nothing; used in tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    state: Mutex<Option<PersistedState>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// The last saved record, if any.
    pub fn saved(&self) -> Option<PersistedState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<PersistedState>, CoreError> {
        Ok(self.saved())
    }

    fn save(&self, state: &PersistedState) -> Result<(), CoreError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        Ok(())
    }
}
