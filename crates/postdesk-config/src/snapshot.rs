// Session record on disk: `{data_dir}/{profile}/app-storage.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use postdesk_core::{CoreError, PersistedRecord, PersistedState, STORAGE_NAME, SnapshotStore};

use crate::data_dir;

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The canonical record for `profile` under the platform data dir.
    pub fn for_profile(profile: &str) -> Self {
        Self::new(data_dir().join(profile).join(format!("{STORAGE_NAME}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, what: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Storage {
        message: format!("{what} {}: {err}", path.display()),
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<PersistedState>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, "cannot read", e)),
        };
        let record: PersistedRecord = serde_json::from_str(&raw)
            .map_err(|e| storage_error(&self.path, "malformed session record", e))?;
        debug!(path = %self.path.display(), version = record.version, "loaded session record");
        Ok(Some(record.state))
    }

    fn save(&self, state: &PersistedState) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| storage_error(parent, "cannot create", e))?;
        }
        let record = PersistedRecord::from(state.clone());
        let json = serde_json::to_string(&record)
            .map_err(|e| storage_error(&self.path, "cannot encode", e))?;
        std::fs::write(&self.path, json).map_err(|e| storage_error(&self.path, "cannot write", e))
    }
}
