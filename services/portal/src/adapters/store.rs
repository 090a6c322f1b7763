//! services/portal/src/adapters/store.rs
//!
//! Session store adapters: a JSON file on disk for the binary, and an in-memory
//! store for embedding and tests.

use booking_portal_core::domain::Credential;
use booking_portal_core::ports::SessionStore;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Persists the credential as `{ "token": "..." }` in a single file.
///
/// The store contract has no failure channel, so I/O problems are logged and a
/// file that cannot be read counts as "no credential".
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Credential> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => Some(Credential::new(stored.token)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, credential: &Credential) {
        let stored = StoredSession {
            token: credential.as_str().to_string(),
        };
        let result = serde_json::to_string(&stored)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, json)
            });
        match result {
            Ok(()) => debug!(path = %self.path.display(), "Session persisted"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to persist session"),
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Session file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove session file"),
        }
    }
}

/// Keeps the credential in memory for the life of the process.
#[derive(Default)]
pub struct MemorySessionStore {
    credential: Mutex<Option<Credential>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credential: &Credential) {
        *self
            .credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.clone());
    }

    fn clear(&self) {
        *self
            .credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
