//! Storage Layer
//!
//! JSON adapter over a durable key-value backend.
//!
//! Reads never fail: a missing or corrupt value yields the caller's default and
//! the parse failure is logged. Writes never fail either: serialization and
//! quota faults are logged and swallowed, so in-memory state can run ahead of
//! the stored copy until the next successful write.

mod backend;
pub mod keys;

#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub use backend::{KeyValueBackend, MemoryBackend};

#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteBackend;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserBackend;

/// Outcome of a typed read
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Never written
    Missing,
    /// Present but unreadable (corrupt JSON or backend failure)
    Unreadable,
    Found(T),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Shared handle to the session's durable store
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Ephemeral store for tests and previews
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Typed read distinguishing missing from unreadable
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Lookup::Missing,
            Err(e) => {
                log::error!("Failed to read '{}': {}", key, e);
                return Lookup::Unreadable;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Lookup::Found(value),
            Err(source) => {
                let err = StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                };
                log::error!("{}", err);
                Lookup::Unreadable
            }
        }
    }

    /// Typed read falling back to `default`
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.lookup(key).found().unwrap_or(default)
    }

    /// Plain-text read (values written with `set_text`)
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    /// Serialize and write, reporting failures
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &json)
    }

    /// Serialize and write; failures are logged and swallowed
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            log::error!("Failed to persist '{}': {}", key, e);
        }
    }

    /// Write plain text without JSON quoting; failures are logged and swallowed
    pub fn set_text(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.write(key, value) {
            log::error!("Failed to persist '{}': {}", key, e);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            log::error!("Failed to remove '{}': {}", key, e);
        }
    }
}
