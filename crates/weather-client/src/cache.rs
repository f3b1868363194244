//! In-memory LRU cache with per-entry time-to-live.
//!
//! ## Eviction Strategy
//! - Entry-count LRU eviction when the capacity is exceeded
//! - TTL-based expiration on read (lazy)

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Statistics for a TTL cache.
#[derive(Default)]
pub struct CacheStats {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses (expired reads included).
    pub misses: AtomicU64,
    /// Total entries evicted by the LRU bound.
    pub evictions: AtomicU64,
    /// Total entries expired via TTL.
    pub expired: AtomicU64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU cache of cloneable values keyed by string, with a fixed TTL.
pub struct TtlCache<V> {
    name: &'static str,
    cache: RwLock<LruCache<String, CachedEntry<V>>>,
    ttl: Duration,
    stats: CacheStats,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `max_entries` values for `ttl` each.
    pub fn new(name: &'static str, max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        tracing::debug!(
            cache = name,
            max_entries = capacity.get(),
            ttl_secs = ttl.as_secs(),
            "TtlCache initialized"
        );

        Self {
            name,
            cache: RwLock::new(LruCache::new(capacity)),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// Get a live value, promoting it in LRU order.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.cache.write().await;

        let expired = match cache.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            cache.pop(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value, evicting the least recently used entry when full.
    pub async fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = CachedEntry {
            value,
            inserted_at: Instant::now(),
        };

        let mut cache = self.cache.write().await;
        // push returns the replaced entry for an existing key, or the LRU victim
        if let Some((old_key, _)) = cache.push(key.clone(), entry) {
            if old_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cache = self.name, key = %old_key, "TtlCache evicted entry");
            }
        }
    }

    /// Remove a value.
    pub async fn remove(&self, key: &str) -> Option<V> {
        self.cache.write().await.pop(key).map(|e| e.value)
    }

    /// Number of stored entries, expired ones included until read.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        tracing::info!(cache = self.name, entries = count, "TtlCache cleared");
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = TtlCache::new("test", 10, Duration::from_secs(300));
        cache.put("taiyuan", 42u32).await;

        assert_eq!(cache.get("taiyuan").await, Some(42));
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache: TtlCache<u32> = TtlCache::new("test", 10, Duration::from_secs(300));

        assert!(cache.get("unknown").await.is_none());
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = TtlCache::new("test", 10, Duration::from_millis(20));
        cache.put("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.stats().expired.load(Ordering::Relaxed), 1);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_lru_bound() {
        let cache = TtlCache::new("test", 2, Duration::from_secs(300));
        cache.put("a", 1).await;
        cache.put("b", 2).await;

        // Touch "a" so "b" becomes least recently used
        assert_eq!(cache.get("a").await, Some(1));
        cache.put("c", 3).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("b").await.is_none());
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("c").await, Some(3));
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_replace_is_not_eviction() {
        let cache = TtlCache::new("test", 2, Duration::from_secs(300));
        cache.put("a", 1).await;
        cache.put("a", 2).await;

        assert_eq!(cache.get("a").await, Some(2));
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let cache = TtlCache::new("test", 10, Duration::from_secs(300));

        cache.get("k1").await;
        cache.put("k1", 1).await;
        cache.get("k1").await;
        cache.get("k2").await;

        // 1 hit, 2 misses
        let hit_rate = cache.stats().hit_rate();
        assert!((hit_rate - 33.33).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TtlCache::new("test", 10, Duration::from_secs(300));
        cache.put("a", 1).await;
        cache.put("b", 2).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
