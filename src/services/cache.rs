use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache for computed values.
/// Entries are evicted lazily: an expired entry costs nothing until the next
/// lookup touches it.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    entries: Arc<DashMap<K, CachedEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.value.clone());
            }
            // TTL expired, remove from cache
            drop(entry); // Release the read lock
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        self.entries.insert(
            key,
            CachedEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Returns the cached value for `key`, or runs `compute` and caches a
    /// successful result for `ttl`. Errors are never cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let value = compute().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_cache_stores_and_retrieves() {
        let cache: TtlCache<String, String> = TtlCache::new();

        cache.insert("key".to_string(), "value".to_string(), Duration::from_secs(60));

        assert_eq!(cache.get(&"key".to_string()), Some("value".to_string()));
        assert_eq!(cache.get(&"missing".to_string()), None);
    }

    #[test]
    fn test_cache_expires() {
        let cache: TtlCache<String, u32> = TtlCache::new();

        cache.insert("key".to_string(), 1, Duration::from_millis(100));
        assert_eq!(cache.get(&"key".to_string()), Some(1));

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get(&"key".to_string()), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_compute_runs_once_per_window() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: Result<u32, ()> = cache
                .get_or_compute("key".to_string(), Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_recomputes_after_expiry() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        let calls = AtomicU32::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, ()>(7)
        };

        cache
            .get_or_compute("key".to_string(), Duration::from_millis(50), compute)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        cache
            .get_or_compute("key".to_string(), Duration::from_millis(50), compute)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_or_compute_does_not_cache_errors() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let result: Result<u32, &str> = cache
                .get_or_compute("key".to_string(), Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("boom")
                })
                .await;
            assert!(result.is_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
