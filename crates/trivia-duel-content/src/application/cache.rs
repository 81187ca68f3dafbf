//! Time-to-live cache for a single fetched value.
//!
//! Used for the category list, which changes rarely and is read at the
//! start of every new round.

use std::future::Future;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// A value that is refetched once it is older than the TTL.
///
/// A failed fetch leaves the previous entry in place but does not serve
/// it; the error goes to the caller and the next read tries again.
pub struct TtlValue<V> {
    entry: RwLock<Option<Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone + Send + Sync> TtlValue<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    /// The cached value if it has not expired.
    pub async fn get(&self) -> Option<V> {
        let guard = self.entry.read().await;
        guard
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Returns the cached value, or runs `fetch` and caches its result.
    ///
    /// Concurrent misses are serialised so a burst of new rounds causes a
    /// single fetch.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns on failure; nothing is cached.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get().await {
            return Ok(value);
        }

        let mut guard = self.entry.write().await;
        if let Some(entry) = guard.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.value.clone());
            }
        }

        let value = fetch().await?;
        *guard = Some(Entry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drops the cached value.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}
