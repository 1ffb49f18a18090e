//! Cache Store Module
//!
//! Main cache engine: a concurrent key-value map with per-entry TTL, lazy
//! expiration on read, and an owned background sweeper.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, CacheEntry, CacheStats, MIN_SWEEP_INTERVAL};
use crate::tasks::spawn_sweeper;

// == Cache State ==
/// Everything guarded by the engine's lock.
#[derive(Debug)]
pub(crate) struct CacheState<V> {
    /// Key-value storage
    pub(crate) entries: HashMap<String, CacheEntry<V>>,
    /// True from construction until the first `stop`
    pub(crate) sweeper_active: bool,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            sweeper_active: true,
        }
    }
}

// == Sweep ==
/// Evicts every expired entry, recording one expiration per eviction.
///
/// Does nothing once the sweeper has been deactivated, even if a tick was
/// already waiting on the lock when `stop` ran. A single clock reading is
/// used for the whole pass.
pub(crate) async fn sweep<V>(state: &RwLock<CacheState<V>>, stats: &CacheStats) -> usize {
    let mut state = state.write().await;
    if !state.sweeper_active {
        return 0;
    }

    let now = Utc::now();
    let before = state.entries.len();
    state.entries.retain(|_, entry| !entry.is_expired_at(now));
    let removed = before - state.entries.len();

    stats.record_expirations(removed as u64);
    removed
}

// == TTL Cache ==
/// Concurrent in-memory cache whose entries expire after a per-key TTL.
///
/// Each instance owns its statistics and its sweeper task, so several caches
/// can live side by side without interfering. Construction spawns the
/// sweeper on the current Tokio runtime.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use chrono::Duration;
/// use ttl_cache::TtlCache;
///
/// let cache = TtlCache::new();
/// cache.set("greeting", "hello".to_string(), Duration::seconds(60)).await;
/// assert_eq!(cache.get("greeting").await.as_deref(), Some("hello"));
/// cache.stop().await;
/// # }
/// ```
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Entries and the sweeper flag, shared with the sweeper task
    state: Arc<RwLock<CacheState<V>>>,
    /// Operation counters, shared with the sweeper task
    stats: Arc<CacheStats>,
    /// Cancellation signal observed by the sweeper; dropping it also ends the task
    shutdown: watch::Sender<bool>,
    /// Sweeper task, taken by the first `stop`
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache sweeping once per second.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty cache with the given configuration.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn with_config(config: CacheConfig) -> Self {
        let state = Arc::new(RwLock::new(CacheState::new()));
        let stats = Arc::new(CacheStats::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let interval = config.sweep_interval.max(MIN_SWEEP_INTERVAL);
        let handle = spawn_sweeper(Arc::clone(&state), Arc::clone(&stats), interval, shutdown_rx);

        Self {
            state,
            stats,
            shutdown,
            sweeper: Mutex::new(Some(handle)),
        }
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// An existing entry is replaced outright, value and expiration alike.
    /// A zero or negative `ttl` stores an entry that is already expired.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        {
            let mut state = self.state.write().await;
            state.entries.insert(key.into(), entry);
        }
        self.stats.record_set();
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// While the sweeper is active, expired entries are reported as missing
    /// but left in place for the sweeper to evict. After `stop`, expiration
    /// is no longer checked and every present entry is served.
    pub async fn get(&self, key: &str) -> Option<V> {
        let state = self.state.read().await;
        match state.entries.get(key) {
            Some(entry) if !(state.sweeper_active && entry.is_expired()) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key` if present. The delete counter is bumped either way.
    pub async fn delete(&self, key: &str) {
        {
            let mut state = self.state.write().await;
            state.entries.remove(key);
        }
        self.stats.record_delete();
    }

    // == Sweep Expired ==
    /// Runs one sweep cycle now and returns the number of evicted entries.
    ///
    /// This is the routine the background sweeper runs on every tick.
    pub async fn sweep_expired(&self) -> usize {
        sweep(&self.state, &self.stats).await
    }

    // == Stop ==
    /// Deactivates the sweeper and waits for its task to finish.
    ///
    /// Safe to call any number of times; only the first call has an effect.
    /// Once stopped, the cache stays stopped.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if !state.sweeper_active {
                debug!("Cache already stopped");
                return;
            }
            state.sweeper_active = false;
        }

        // A watch send never blocks, even when the sweeper is already gone.
        let _ = self.shutdown.send(true);

        let handle = self.sweeper.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Sweeper task ended abnormally: {}", err);
            }
        }
        info!("Cache stopped");
    }

    /// Returns true until `stop` has been called.
    pub async fn is_running(&self) -> bool {
        self.state.read().await.sweeper_active
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones not yet swept included.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    // == Stats ==
    /// Returns the operation counters of this cache.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns a shared handle to the operation counters.
    pub fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn fast_config() -> CacheConfig {
        CacheConfig::new(StdDuration::from_millis(20))
    }

    #[tokio::test]
    async fn test_cache_new() {
        let cache: TtlCache<String> = TtlCache::new();
        assert_eq!(cache.len().await, 0);
        assert!(cache.is_empty().await);
        assert!(cache.is_running().await);
        assert_eq!(cache.stats().snapshot().total(), 0);
    }

    #[tokio::test]
    async fn test_get_never_set_is_miss() {
        let cache: TtlCache<String> = TtlCache::new();

        assert!(cache.get("nonexistent").await.is_none());

        let stats = cache.stats().snapshot();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = TtlCache::new();

        cache.set("key1", "value1".to_string(), Duration::seconds(60)).await;

        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
        let stats = cache.stats().snapshot();
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[tokio::test]
    async fn test_empty_key_is_ordinary() {
        let cache = TtlCache::new();

        cache.set("", 7u32, Duration::seconds(60)).await;

        assert_eq!(cache.get("").await, Some(7));
        cache.delete("").await;
        assert!(cache.get("").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_expiration() {
        let cache = TtlCache::new();

        cache.set("key1", "value1".to_string(), Duration::seconds(-10)).await;
        cache.set("key1", "value2".to_string(), Duration::seconds(60)).await;

        assert_eq!(cache.get("key1").await, Some("value2".to_string()));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.stats().snapshot().sets, 2);
    }

    #[tokio::test]
    async fn test_overwrite_with_past_ttl_hides_value() {
        let cache = TtlCache::new();

        cache.set("key1", "value1".to_string(), Duration::seconds(60)).await;
        cache.set("key1", "value2".to_string(), Duration::seconds(-1)).await;

        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_non_positive_ttl_is_miss_while_running() {
        let cache = TtlCache::new();

        cache.set("zero", 1u8, Duration::zero()).await;
        cache.set("negative", 2u8, Duration::seconds(-5)).await;

        assert!(cache.get("zero").await.is_none());
        assert!(cache.get("negative").await.is_none());

        let stats = cache.stats().snapshot();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
        // Lazy expiration leaves the entries for the sweeper
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_entry_served_after_stop() {
        let cache = TtlCache::new();
        cache.stop().await;

        cache.set("frozen", "original".to_string(), Duration::seconds(-5)).await;

        assert_eq!(cache.get("frozen").await, Some("original".to_string()));
        assert_eq!(cache.stats().snapshot().hits, 1);
    }

    #[tokio::test]
    async fn test_stop_freezes_previously_expired_entries() {
        let cache = TtlCache::new();
        cache.set("key", 10i64, Duration::seconds(-1)).await;
        assert!(cache.get("key").await.is_none());

        cache.stop().await;

        assert_eq!(cache.get("key").await, Some(10));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = TtlCache::new();

        cache.set("key1", "value1".to_string(), Duration::seconds(60)).await;
        cache.delete("key1").await;

        assert!(cache.is_empty().await);
        assert!(cache.get("key1").await.is_none());
        assert_eq!(cache.stats().snapshot().deletes, 1);
    }

    #[tokio::test]
    async fn test_delete_absent_only_counts_delete() {
        let cache: TtlCache<String> = TtlCache::new();

        cache.delete("nonexistent").await;

        let stats = cache.stats().snapshot();
        assert_eq!(stats.deletes, 1);
        assert_eq!(stats.total(), 1);
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_expired() {
        let cache = TtlCache::new();
        for i in 0..5 {
            cache.set(format!("past{i}"), i, Duration::seconds(-1)).await;
        }
        for i in 0..3 {
            cache.set(format!("future{i}"), i, Duration::seconds(3600)).await;
        }

        let removed = cache.sweep_expired().await;

        assert_eq!(removed, 5);
        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.stats().snapshot().expirations, 5);
        for i in 0..3 {
            assert_eq!(cache.get(&format!("future{i}")).await, Some(i));
        }
    }

    #[tokio::test]
    async fn test_sweep_after_stop_does_nothing() {
        let cache = TtlCache::new();
        cache.set("old", (), Duration::seconds(-1)).await;
        cache.stop().await;

        assert_eq!(cache.sweep_expired().await, 0);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.stats().snapshot().expirations, 0);
    }

    #[tokio::test]
    async fn test_background_sweeper_evicts() {
        let cache = TtlCache::with_config(fast_config());
        cache.set("short", "v".to_string(), Duration::milliseconds(10)).await;
        cache.set("long", "v".to_string(), Duration::seconds(3600)).await;

        tokio::time::sleep(StdDuration::from_millis(200)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.stats().snapshot().expirations, 1);
        cache.stop().await;
    }

    #[tokio::test]
    async fn test_stop_twice() {
        let cache: TtlCache<String> = TtlCache::with_config(fast_config());

        cache.stop().await;
        cache.stop().await;

        assert!(!cache.is_running().await);
    }

    #[tokio::test]
    async fn test_no_sweep_after_stop() {
        let cache = TtlCache::with_config(fast_config());
        cache.stop().await;

        cache.set("expired", 1u64, Duration::seconds(-1)).await;
        tokio::time::sleep(StdDuration::from_millis(150)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.stats().snapshot().expirations, 0);
    }

    #[tokio::test]
    async fn test_stats_handle_outlives_cache() {
        let cache = TtlCache::new();
        let stats = cache.stats_handle();

        cache.set("k", 'x', Duration::seconds(60)).await;
        cache.stop().await;
        drop(cache);

        assert_eq!(stats.snapshot().sets, 1);
    }

    #[tokio::test]
    async fn test_instances_are_independent() {
        let first = TtlCache::new();
        let second: TtlCache<u8> = TtlCache::new();

        first.set("a", 1u8, Duration::seconds(60)).await;
        first.stop().await;

        assert!(second.get("a").await.is_none());
        assert!(second.is_running().await);
        assert_eq!(second.stats().snapshot().sets, 0);
        assert_eq!(first.stats().snapshot().sets, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_operations_keep_exact_counts() {
        let cache = Arc::new(TtlCache::with_config(fast_config()));
        let tasks = 16;
        let per_task = 200;

        let handles: Vec<_> = (0..tasks)
            .map(|t| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    for i in 0..per_task {
                        let key = format!("task{t}:key{i}");
                        cache.set(key.clone(), i, Duration::seconds(3600)).await;
                        assert_eq!(cache.get(&key).await, Some(i));
                        cache.delete(&key).await;
                        assert!(cache.get(&key).await.is_none());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let issued = (tasks * per_task) as u64;
        let stats = cache.stats().snapshot();
        assert_eq!(stats.sets, issued);
        assert_eq!(stats.hits, issued);
        assert_eq!(stats.deletes, issued);
        assert_eq!(stats.misses, issued);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.total(), issued * 4);
        assert!(cache.is_empty().await);

        cache.stop().await;
    }
}
