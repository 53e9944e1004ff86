//! Sliding-window rate limiting per caller identifier.
//!
//! Each identifier owns a list of accepted attempt timestamps stored as a
//! JSON array under `rate_limit_<identifier>` in a [`KeyValueStore`]. On
//! every check the entries that fell out of the window are dropped before
//! the remaining count is compared with the limit.

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{KeyValueStore, MemoryStore};

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use clock::duration_millis;

const KEY_PREFIX: &str = "rate_limit_";

/// How many attempts an identifier may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitPolicy {
    pub limit: usize,
    pub window_ms: u64,
}

impl RateLimitPolicy {
    /// Allow `limit` attempts per trailing `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            limit: 5,
            window_ms: 60_000,
        }
    }
}

/// Thread-safe sliding-window rate limiter.
///
/// Read-filter-append for one identifier runs under that identifier's lock,
/// so concurrent attempts are never undercounted. Different identifiers do
/// not contend.
///
/// When the state store fails the limiter fails open: the attempt is allowed
/// and a warning is logged.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use commentator::RateLimiter;
///
/// let limiter = RateLimiter::in_memory();
/// let window = Duration::from_secs(60);
/// for _ in 0..3 {
///     assert!(!limiter.is_rate_limited("user-1", 3, window));
/// }
/// assert!(limiter.is_rate_limited("user-1", 3, window));
/// assert!(!limiter.is_rate_limited("user-2", 3, window));
/// ```
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RateLimiter {
    /// Limiter keeping its windows in `store` and reading time from `clock`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: DashMap::new(),
        }
    }

    /// Limiter backed by a [`MemoryStore`] and the [`SystemClock`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    /// Returns `true` if `identifier` already made `limit` accepted attempts
    /// within the trailing `window`. Otherwise records this attempt and
    /// returns `false`.
    pub fn is_rate_limited(&self, identifier: &str, limit: usize, window: Duration) -> bool {
        let lock = self.lock_for(identifier);
        let _guard = lock.lock();

        let key = state_key(identifier);
        let now = self.clock.now_millis();
        let window_start = now.saturating_sub(duration_millis(window));

        let mut timestamps = self.load(&key);
        timestamps.retain(|t| *t > window_start);

        if timestamps.len() >= limit {
            tracing::warn!(identifier, limit, "Rate limit exceeded");
            return true;
        }

        timestamps.push(now);
        if let Err(e) = self.save(&key, &timestamps) {
            tracing::warn!(identifier, "Failed to persist rate-limit state: {e}");
        }
        false
    }

    /// [`is_rate_limited`](Self::is_rate_limited) with the limit and window
    /// taken from `policy`.
    pub fn check(&self, identifier: &str, policy: &RateLimitPolicy) -> bool {
        self.is_rate_limited(identifier, policy.limit, policy.window())
    }

    /// Forget every recorded attempt of `identifier`.
    ///
    /// The identifier's lock entry is dropped too unless another caller is
    /// still holding it.
    pub fn reset(&self, identifier: &str) -> Result<()> {
        let lock = self.lock_for(identifier);
        let deleted = {
            let _guard = lock.lock();
            self.store.delete(&state_key(identifier))
        };
        drop(lock);
        // Checked under the shard lock, so no clone can be handed out meanwhile.
        self.locks.remove_if(identifier, |_, l| Arc::strong_count(l) == 1);
        deleted
    }

    fn lock_for(&self, identifier: &str) -> Arc<Mutex<()>> {
        // Clone out of the map so the shard lock is released before we block.
        self.locks
            .entry(identifier.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn load(&self, key: &str) -> Vec<i64> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, "Failed to read rate-limit state: {e}");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!(key, "Discarding unreadable rate-limit state: {e}");
            Vec::new()
        })
    }

    fn save(&self, key: &str, timestamps: &[i64]) -> Result<()> {
        self.store.set(key, serde_json::to_string(timestamps)?)
    }
}

fn state_key(identifier: &str) -> String {
    format!("{KEY_PREFIX}{identifier}")
}
