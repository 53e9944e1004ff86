//! Key-value storage for rate-limit state.

use dashmap::DashMap;

use crate::error::Result;

/// String-keyed storage the [`RateLimiter`](super::RateLimiter) persists its
/// timestamp windows in.
///
/// Mirrors a browser session store: values are opaque strings and the store
/// gives no cross-process guarantees.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing what was there.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-process [`KeyValueStore`]; state lives as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
