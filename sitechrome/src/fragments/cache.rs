//! Redis-backed fragment cache.
//!
//! A thin namespaced wrapper over a deadpool-redis pool. Connections are
//! checked out per operation, so one slow request never holds the cache for
//! another, and a request that finds the backend down leaves the pool free to
//! recover before the next one. Every runtime failure degrades: reads become
//! misses and writes become no-ops, each with a debug log, keeping the
//! acquisition path fail-open.

use std::fmt;

use deadpool_redis::{Config as RedisConfig, Pool, Runtime};
use thiserror::Error;
use tracing::debug;

use crate::config::CacheSettings;

/// Namespace prepended to every key this crate writes.
pub const DEFAULT_NAMESPACE: &str = "chrome";

#[derive(Debug, Error)]
enum CacheOpError {
    #[error("connection checkout failed: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("command failed: {0}")]
    Command(#[from] redis::RedisError),
}

/// Storage behind the cache handle. Unit tests swap in a process-local map
/// so hits and misses are observable without a Redis backend.
#[derive(Clone)]
enum Backend {
    Redis(Pool),
    #[cfg(test)]
    Memory(std::sync::Arc<parking_lot::Mutex<std::collections::HashMap<String, String>>>),
}

/// Handle to the shared fragment cache.
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Clone)]
pub struct FragmentCache {
    backend: Backend,
    namespace: String,
    ttl_secs: u64,
}

impl fmt::Debug for FragmentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentCache")
            .field("namespace", &self.namespace)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl FragmentCache {
    /// Build the connection pool for `namespace`.
    ///
    /// The first actual connection is attempted lazily on first use, so this
    /// succeeds even while the backend is down.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection URL cannot be parsed or the pool
    /// cannot be configured.
    pub fn connect(namespace: &str, settings: &CacheSettings) -> anyhow::Result<Self> {
        let pool = RedisConfig::from_url(settings.url.clone()).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self {
            backend: Backend::Redis(pool),
            namespace: namespace.to_owned(),
            ttl_secs: settings.ttl_secs,
        })
    }

    /// Cache over a process-local map, for tests that need to observe hits
    /// and misses.
    #[cfg(test)]
    pub(crate) fn in_memory(namespace: &str) -> Self {
        Self {
            backend: Backend::Memory(std::sync::Arc::default()),
            namespace: namespace.to_owned(),
            ttl_secs: 600,
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}:{suffix}", self.namespace)
    }

    /// Look up a raw payload. Any backend failure reads as a miss.
    pub async fn get_raw(&self, suffix: &str) -> Option<String> {
        let key = self.key(suffix);
        match self.fetch(&key).await {
            Ok(value) => value,
            Err(err) => {
                debug!(key = %key, error = %err, "cache read failed, treating as a miss");
                None
            }
        }
    }

    /// Store a raw payload under the configured TTL. Failures are logged and
    /// dropped.
    pub async fn put_raw(&self, suffix: &str, payload: &str) {
        let key = self.key(suffix);
        if let Err(err) = self.store(&key, payload).await {
            debug!(key = %key, error = %err, "cache write failed");
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, CacheOpError> {
        match &self.backend {
            Backend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let value: Option<String> =
                    redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
                Ok(value)
            }
            #[cfg(test)]
            Backend::Memory(map) => Ok(map.lock().get(key).cloned()),
        }
    }

    async fn store(&self, key: &str, payload: &str) -> Result<(), CacheOpError> {
        match &self.backend {
            Backend::Redis(pool) => {
                let mut conn = pool.get().await?;
                // Saturate at i64::MAX to avoid wrapping
                let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
                let _: () = redis::cmd("SET")
                    .arg(key)
                    .arg(payload)
                    .arg("EX")
                    .arg(ttl)
                    .query_async(&mut *conn)
                    .await?;
                Ok(())
            }
            #[cfg(test)]
            Backend::Memory(map) => {
                map.lock().insert(key.to_owned(), payload.to_owned());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_cache() -> FragmentCache {
        let settings = CacheSettings {
            // Nothing listens on port 9; checkout fails fast
            url: "redis://127.0.0.1:9".to_owned(),
            ..CacheSettings::default()
        };
        FragmentCache::connect(DEFAULT_NAMESPACE, &settings).expect("pool construction is lazy")
    }

    #[test]
    fn keys_are_namespaced() {
        let cache = unreachable_cache();
        assert_eq!(cache.key("blocks:en"), "chrome:blocks:en");
    }

    #[tokio::test]
    async fn unreachable_backend_reads_as_a_miss() {
        let cache = unreachable_cache();
        assert_eq!(cache.get_raw("blocks:en").await, None);
    }

    #[tokio::test]
    async fn unreachable_backend_swallows_writes() {
        let cache = unreachable_cache();
        cache.put_raw("blocks:en", "{}").await;
    }

    #[tokio::test]
    async fn in_memory_backend_round_trips_payloads() {
        let cache = FragmentCache::in_memory(DEFAULT_NAMESPACE);
        cache.put_raw("blocks:en", "cached").await;
        assert_eq!(cache.get_raw("blocks:en").await.as_deref(), Some("cached"));
        assert_eq!(cache.get_raw("blocks:sv").await, None);
    }
}
