//! Bounded entity cache with timestamp-ordered eviction.

use crate::{CacheConfig, CacheEntry, MetricsHook, NoopMetrics};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vasari_core::{Clock, Entity, SystemClock};
use vasari_error::CacheError;

/// Bounded in-memory entity cache with time-based eviction.
///
/// Holds at most `capacity` entities keyed by identity. When an insert
/// would exceed capacity, the entry with the oldest `last_access` is
/// evicted first (LRU-by-timestamp, ties broken by key order). Reading an
/// entry refreshes its timestamp, so hot entries survive both capacity
/// pressure and the staleness sweep.
///
/// All operations are atomic with respect to each other: the entry map
/// sits behind an internal mutex that is never held across an await
/// point, so the cache can be shared freely between request handlers and
/// the sweep task.
///
/// # Examples
///
/// ```
/// use vasari_cache::{CacheConfig, TimedCache};
/// use vasari_core::Entity;
///
/// #[derive(Debug, Clone)]
/// struct GuildSettings {
///     guild_id: u64,
///     prefix: String,
/// }
///
/// impl Entity for GuildSettings {
///     type Key = u64;
///     fn key(&self) -> u64 {
///         self.guild_id
///     }
/// }
///
/// let cache = TimedCache::new(CacheConfig::default()).expect("valid config");
/// cache.put(GuildSettings { guild_id: 42, prefix: "!".to_string() });
/// assert_eq!(cache.get(&42).map(|s| s.prefix), Some("!".to_string()));
/// ```
pub struct TimedCache<E: Entity> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsHook>,
    entries: Mutex<HashMap<E::Key, CacheEntry<E>>>,
}

impl<E: Entity> TimedCache<E> {
    /// Create a cache with the system clock and no metrics hook.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails [`CacheConfig::validate`].
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        tracing::debug!(
            capacity = config.capacity(),
            staleness_secs = config.staleness_secs(),
            "Creating timed cache"
        );
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(NoopMetrics),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the time source. Intended for tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Install a metrics hook.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsHook>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up an entity, refreshing its access timestamp on hit.
    ///
    /// Absence is not an error and does not fall through to any backing
    /// store; read-through orchestration lives one layer up.
    #[tracing::instrument(skip(self), fields(key = ?key))]
    pub fn get(&self, key: &E::Key) -> Option<E> {
        let mut entries = self.lock_entries();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.touch(self.clock.now());
                self.metrics.hit();
                tracing::debug!("Cache hit");
                Some(entry.entity().clone())
            }
            None => {
                self.metrics.miss();
                tracing::debug!("Cache miss");
                None
            }
        }
    }

    /// Insert or overwrite an entity under its own key.
    ///
    /// An overwrite refreshes the timestamp. A fresh insert at capacity
    /// first evicts the entry with the oldest `last_access`.
    #[tracing::instrument(skip(self, entity), fields(key = ?entity.key()))]
    pub fn put(&self, entity: E) {
        let mut entries = self.lock_entries();
        self.put_locked(&mut entries, entity);
    }

    /// Bulk insert, applied in iteration order under a single lock.
    ///
    /// Used for startup pre-population. Capacity is enforced throughout,
    /// so loading more entities than fit is allowed and bounded: entries
    /// inserted later in the iteration win.
    pub fn insert_many<I>(&self, entities: I)
    where
        I: IntoIterator<Item = E>,
    {
        let mut entries = self.lock_entries();
        let mut count = 0usize;
        for entity in entities {
            self.put_locked(&mut entries, entity);
            count += 1;
        }
        tracing::debug!(inserted = count, retained = entries.len(), "Bulk insert");
    }

    /// Remove and return an entity. No-op when absent.
    pub fn pop(&self, key: &E::Key) -> Option<E> {
        let mut entries = self.lock_entries();
        entries.remove(key).map(CacheEntry::into_entity)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Remove entries unread for longer than the staleness horizon.
    ///
    /// Does nothing below the high-water mark: sweeping a mostly-empty
    /// cache is wasted work, and entries below the mark are allowed to
    /// age in place. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock_entries();

        if entries.len() < self.config.high_water_mark() {
            tracing::trace!(
                len = entries.len(),
                high_water = self.config.high_water_mark(),
                "Sweep skipped below high-water mark"
            );
            return 0;
        }

        let now = self.clock.now();
        let staleness = self.config.staleness();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(now, staleness));
        let removed = before - entries.len();

        if removed > 0 {
            self.metrics.sweep_removed(removed);
            tracing::info!(removed, remaining = entries.len(), "Swept stale entries");
        }
        removed
    }

    /// Insert under an already-held lock, evicting first when needed.
    fn put_locked(&self, entries: &mut HashMap<E::Key, CacheEntry<E>>, entity: E) {
        let key = entity.key();
        let now = self.clock.now();

        if !entries.contains_key(&key) && entries.len() >= *self.config.capacity() {
            self.evict_oldest(entries);
        }
        entries.insert(key, CacheEntry::new(entity, now));
    }

    /// Remove the entry with the minimum `last_access`, ties broken by
    /// key order.
    ///
    /// A linear scan: there is no secondary index, which is fine at the
    /// target scale of hundreds to low thousands of entries.
    fn evict_oldest(&self, entries: &mut HashMap<E::Key, CacheEntry<E>>) {
        let oldest = entries
            .iter()
            .min_by(|(key_a, a), (key_b, b)| {
                a.last_access()
                    .cmp(&b.last_access())
                    .then_with(|| key_a.cmp(key_b))
            })
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            entries.remove(&key);
            self.metrics.eviction();
            tracing::debug!(key = ?key, "Evicted oldest entry");
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<E::Key, CacheEntry<E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheMetrics;
    use std::time::Duration;
    use vasari_core::ManualClock;

    #[derive(Debug, Clone, PartialEq)]
    struct TestEntity {
        id: u64,
        prefix: String,
    }

    impl Entity for TestEntity {
        type Key = u64;

        fn key(&self) -> u64 {
            self.id
        }
    }

    fn entity(id: u64) -> TestEntity {
        TestEntity {
            id,
            prefix: format!("!{id}"),
        }
    }

    fn cache_with_clock(capacity: usize) -> (TimedCache<TestEntity>, ManualClock) {
        let clock = ManualClock::new();
        let cache = TimedCache::new(CacheConfig::default().with_capacity(capacity))
            .expect("valid config")
            .with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_zero_capacity_fails_fast() {
        let result = TimedCache::<TestEntity>::new(CacheConfig::default().with_capacity(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_get_miss_returns_none() {
        let (cache, _clock) = cache_with_clock(3);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _clock) = cache_with_clock(3);
        cache.put(entity(1));
        assert_eq!(cache.get(&1), Some(entity(1)));
    }

    #[test]
    fn test_repeated_get_is_idempotent() {
        let (cache, _clock) = cache_with_clock(3);
        cache.put(entity(1));
        let first = cache.get(&1);
        let second = cache.get(&1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_invariant_under_churn() {
        let (cache, clock) = cache_with_clock(10);
        for id in 0..50 {
            cache.put(entity(id));
            clock.advance(Duration::from_secs(1));
            assert!(cache.len() <= 10);
        }
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn test_eviction_removes_oldest() {
        // capacity 3: A, B, C at t=1,2,3; D at t=4 evicts A
        let (cache, clock) = cache_with_clock(3);
        for id in [1, 2, 3] {
            clock.advance(Duration::from_secs(1));
            cache.put(entity(id));
        }
        clock.advance(Duration::from_secs(1));
        cache.put(entity(4));

        assert_eq!(cache.get(&1), None);
        assert!(cache.get(&2).is_some());
        assert!(cache.get(&3).is_some());
        assert!(cache.get(&4).is_some());
    }

    #[test]
    fn test_refresh_on_read_protects_entry() {
        // A(t=1), B(t=2), C(t=3); get(A) at t=4; D at t=5 evicts B, not A
        let (cache, clock) = cache_with_clock(3);
        for id in [1, 2, 3] {
            clock.advance(Duration::from_secs(1));
            cache.put(entity(id));
        }
        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&1).is_some());
        clock.advance(Duration::from_secs(1));
        cache.put(entity(4));

        assert!(cache.get(&1).is_some());
        assert_eq!(cache.get(&2), None);
        assert!(cache.get(&3).is_some());
        assert!(cache.get(&4).is_some());
    }

    #[test]
    fn test_eviction_tie_break_is_deterministic() {
        // all entries share a timestamp; the smallest key goes first
        let (cache, _clock) = cache_with_clock(3);
        for id in [7, 3, 5] {
            cache.put(entity(id));
        }
        cache.put(entity(9));

        assert_eq!(cache.get(&3), None);
        assert!(cache.get(&5).is_some());
        assert!(cache.get(&7).is_some());
        assert!(cache.get(&9).is_some());
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock(2);
        clock.advance(Duration::from_secs(1));
        cache.put(entity(1));
        clock.advance(Duration::from_secs(1));
        cache.put(entity(2));

        // overwriting key 1 makes key 2 the oldest
        clock.advance(Duration::from_secs(1));
        cache.put(TestEntity {
            id: 1,
            prefix: "?".to_string(),
        });
        clock.advance(Duration::from_secs(1));
        cache.put(entity(3));

        assert_eq!(cache.get(&1).map(|e| e.prefix), Some("?".to_string()));
        assert_eq!(cache.get(&2), None);
        assert!(cache.get(&3).is_some());
    }

    #[test]
    fn test_insert_many_is_bounded_and_last_wins() {
        let (cache, _clock) = cache_with_clock(3);
        cache.insert_many((1..=5).map(entity));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), None);
        assert!(cache.get(&3).is_some());
        assert!(cache.get(&4).is_some());
        assert!(cache.get(&5).is_some());
    }

    #[test]
    fn test_pop() {
        let (cache, _clock) = cache_with_clock(3);
        cache.put(entity(1));
        assert_eq!(cache.pop(&1), Some(entity(1)));
        assert_eq!(cache.pop(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_below_high_water_is_noop() {
        // capacity 100, ratio 0.9: 85 entries stay put regardless of age
        let clock = ManualClock::new();
        let cache = TimedCache::new(
            CacheConfig::default()
                .with_capacity(100)
                .with_staleness_secs(1800),
        )
        .expect("valid config")
        .with_clock(Arc::new(clock.clone()));

        cache.insert_many((0..85).map(entity));
        clock.advance(Duration::from_secs(4000));

        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.len(), 85);
    }

    #[test]
    fn test_sweep_removes_exactly_the_stale() {
        // 91 entries, 5 of them past the 1800s horizon
        let clock = ManualClock::new();
        let cache = TimedCache::new(
            CacheConfig::default()
                .with_capacity(100)
                .with_staleness_secs(1800),
        )
        .expect("valid config")
        .with_clock(Arc::new(clock.clone()));

        cache.insert_many((0..5).map(entity));
        clock.advance(Duration::from_secs(2000));
        cache.insert_many((5..91).map(entity));

        assert_eq!(cache.sweep(), 5);
        assert_eq!(cache.len(), 86);
        for id in 0..5 {
            assert_eq!(cache.get(&id), None);
        }
        for id in 5..91 {
            assert!(cache.get(&id).is_some());
        }
    }

    #[test]
    fn test_sweep_spares_refreshed_entries() {
        let clock = ManualClock::new();
        let cache = TimedCache::new(
            CacheConfig::default()
                .with_capacity(10)
                .with_staleness_secs(60)
                .with_high_water_ratio(0.5),
        )
        .expect("valid config")
        .with_clock(Arc::new(clock.clone()));

        cache.insert_many((0..10).map(entity));
        clock.advance(Duration::from_secs(50));
        // reading key 0 refreshes it past the others
        assert!(cache.get(&0).is_some());
        clock.advance(Duration::from_secs(20));

        let removed = cache.sweep();
        assert_eq!(removed, 9);
        assert!(cache.get(&0).is_some());
    }

    #[test]
    fn test_metrics_hook_observes_activity() {
        let metrics = Arc::new(CacheMetrics::new());
        let clock = ManualClock::new();
        let cache = TimedCache::new(
            CacheConfig::default()
                .with_capacity(2)
                .with_staleness_secs(10)
                .with_high_water_ratio(0.5),
        )
        .expect("valid config")
        .with_clock(Arc::new(clock.clone()))
        .with_metrics(metrics.clone());

        cache.put(entity(1));
        cache.put(entity(2));
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&99).is_none());
        cache.put(entity(3)); // evicts
        clock.advance(Duration::from_secs(100));
        cache.sweep(); // removes both survivors

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.swept, 2);
    }
}
