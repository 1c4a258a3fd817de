//! Durable key-value storage for the persisted session.
//!
//! DESIGN
//! ======
//! The session survives restarts through three fixed string keys: `token`,
//! `refreshToken`, and `user` (JSON). `KeyValueStore` is the raw backend
//! (in-memory or a JSON file on disk); `SessionStorage` owns the key names
//! and the "all three together" write/clear discipline.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` rewrites the whole file on every mutation. The store holds
//! three small entries, so simplicity wins over incremental writes.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

// =============================================================================
// BACKENDS
// =============================================================================

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several entries. Backends that can should apply them as one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// JSON object file on disk (`{"token": "...", ...}`).
///
/// A missing file reads as empty. Parent directories are created on first write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Current entries for a mutation. An unparsable file is discarded so a
    /// corrupt session never blocks login or logout; the flag reports it.
    fn read_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Serde(e)) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, _) = self.read_for_write()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, _) = self.read_for_write()?;
        for (key, value) in pairs {
            entries.insert((*key).to_owned(), (*value).to_owned());
        }
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, discarded) = self.read_for_write()?;
        if entries.remove(key).is_some() || discarded {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// SESSION STORAGE
// =============================================================================

/// Tokens read back from storage. Only produced when all three keys exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub refresh_token: String,
    /// Raw JSON of the persisted user.
    pub user_json: String,
}

/// Session persistence over a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStorage {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// In-memory session storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Write the token pair and the serialized user. A failed write clears
    /// all three keys so a new token is never paired with a stale user.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any backend write fails.
    pub fn save(&self, user: &User, token: &str, refresh_token: &str) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        let entries = [(TOKEN_KEY, token), (REFRESH_TOKEN_KEY, refresh_token), (USER_KEY, user_json.as_str())];
        let result = self.backend.set_many(&entries);
        if result.is_err() {
            if let Err(e) = self.clear() {
                warn!(error = %e, "failed to roll back partial session write");
            }
        }
        result
    }

    /// Overwrite only the persisted user.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.backend.set(USER_KEY, &user_json)
    }

    /// Read the persisted session. `Ok(None)` if any of the three keys is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let token = self.backend.get(TOKEN_KEY)?.filter(|v| !v.is_empty());
        let refresh_token = self.backend.get(REFRESH_TOKEN_KEY)?.filter(|v| !v.is_empty());
        let user_json = self.backend.get(USER_KEY)?.filter(|v| !v.is_empty());
        match (token, refresh_token, user_json) {
            (Some(token), Some(refresh_token), Some(user_json)) => {
                Ok(Some(StoredSession { token, refresh_token, user_json }))
            }
            _ => Ok(None),
        }
    }

    /// Remove all three keys. Every key is attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first backend error encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.backend.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
