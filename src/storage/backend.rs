//! Key-Value Backends - Core Trait
//!
//! Raw string storage behind the JSON adapter.
//! Implementations can use SQLite, browser localStorage, in-memory, etc.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::StoreError;

/// Durable string store scoped to one origin/profile
pub trait KeyValueBackend: Send + Sync {
    /// Read the raw value under `key`
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the raw value under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-process backend with an optional byte quota
///
/// The quota counts key and value bytes of every entry, the way browser
/// storage accounts for its limit.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: Some(limit),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
