//! Shared-store adapter: the cross-tab communication medium.
//!
//! Every tab runs an independent copy of this subsystem against one shared
//! key-value store. The store is a weakly-consistent, poll-based bus, not a
//! database:
//!
//! - A write from one tab is invisible to another until its next poll.
//! - Concurrent writes to the same key are last-write-wins, no merge.
//! - There is no read-modify-write atomicity; every writer tolerates being
//!   clobbered. Worst case is a missed heartbeat or a re-delivered
//!   directive, never corruption.
//!
//! # Defensive Design
//!
//! Consumers must treat every read as possibly stale and every payload as
//! possibly malformed:
//!
//! - Absent or corrupt payloads deserialize to the type's default.
//! - Writes are best-effort; failures are logged and dropped, and the next
//!   poll cycle retries naturally.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{HavenError, Result};

/// Store keys used by this subsystem. The ban registry is persisted by the
/// credential layer and is not read through these keys.
pub mod keys {
    /// Presence roster: `Vec<SessionRecord>`.
    pub const ACTIVE_SESSIONS: &str = "active_sessions";
    /// Pending kick directives: `Vec<KickEntry>`.
    pub const KICK_LIST: &str = "kick_list";
    /// Panic-return bookmark: structured record or legacy bare string.
    pub const PANIC_RETURN: &str = "panic_return";
    /// External settings document; only stealth/accessibility flags are read.
    pub const SETTINGS: &str = "settings";
}

/// Raw persistence medium behind [`SharedStateStore`].
///
/// Implementations must be tolerant: `read` returns `None` on any failure,
/// `delete` swallows errors. Only `write` reports failure, and callers drop
/// it after logging.
pub trait StorageMedium: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str);
}

/// Typed, tolerant JSON layer over a [`StorageMedium`].
///
/// Cloning yields another handle onto the same medium, the way two tabs
/// share one store.
#[derive(Clone)]
pub struct SharedStateStore {
    medium: Arc<dyn StorageMedium>,
}

impl SharedStateStore {
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        SharedStateStore { medium }
    }

    /// An in-memory store, useful for tests and embedding.
    pub fn in_memory() -> Self {
        SharedStateStore::new(Arc::new(MemoryMedium::default()))
    }

    /// Reads and deserializes `key`, substituting the default value on
    /// absence or corruption. Never fails.
    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get_opt(key).unwrap_or_default()
    }

    /// Reads and deserializes `key`, distinguishing "absent or malformed"
    /// (`None`) from a present value.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.medium.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(key, error = %err, "Discarding malformed store payload");
                None
            }
        }
    }

    /// Serializes and writes `value` under `key`. Best-effort: failures are
    /// logged at warn and dropped, never propagated.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, error = %err, "Failed to serialize store payload");
                return;
            }
        };
        if let Err(err) = self.medium.write(key, &payload) {
            warn!(key, error = %err, "Dropping failed store write");
        }
    }

    pub fn remove(&self, key: &str) {
        self.medium.delete(key);
    }
}

/// Mutex-guarded map medium for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryMedium {
    entries: Mutex<HashMap<String, String>>,
}

impl StorageMedium for MemoryMedium {
    fn read(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// File-backed medium: one JSON document per key under a root directory.
///
/// Writes go through a temp file + rename so a crash mid-write never leaves
/// a truncated document for other tabs to read.
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| HavenError::Io {
            context: format!("Failed to create store root {}", root.display()),
            source,
        })?;
        Ok(FileMedium { root })
    }

    /// Default root: `~/.haven/store`.
    pub fn default_root() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".haven").join("store"))
            .ok_or(HavenError::HomeDirNotFound)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageMedium for FileMedium {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|source| HavenError::Io {
                context: "Failed to create temp store file".to_string(),
                source,
            })?;
        tmp.write_all(value.as_bytes())
            .map_err(|source| HavenError::Io {
                context: "Failed to write temp store file".to_string(),
                source,
            })?;
        tmp.flush().map_err(|source| HavenError::Io {
            context: "Failed to flush temp store file".to_string(),
            source,
        })?;
        tmp.persist(self.key_path(key))
            .map_err(|err| HavenError::Io {
                context: format!("Failed to persist store key {key}"),
                source: err.error,
            })?;
        Ok(())
    }

    fn delete(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}
