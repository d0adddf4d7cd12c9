//! Read-through / write-through orchestration over cache and store.

use crate::{BackingStore, KeyedLocks, StoreResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use vasari_cache::{CacheConfig, EvictionScheduler, TimedCache};
use vasari_core::Entity;
use vasari_error::{StoreError, StoreErrorKind, VasariResult};

type KeyOf<S> = <<S as BackingStore>::Entity as Entity>::Key;

/// Manager of the cached entity store.
///
/// Wraps a [`BackingStore`] with a [`TimedCache`] and owns the
/// interaction between the two: `get` reads through to the store on a
/// miss, `put` and `delete` write through, and `get_or_create` adds
/// single-flight creation so concurrent callers for a missing key
/// resolve to one persisted row. The cache never retries store failures
/// and is left unchanged when one occurs.
///
/// One `CachedStore` instance is created at startup, wrapped in an
/// `Arc`, and handed to every consumer; there is no global registry of
/// caches.
pub struct CachedStore<S: BackingStore> {
    cache: Arc<TimedCache<S::Entity>>,
    store: Arc<S>,
    locks: KeyedLocks<KeyOf<S>>,
    scheduler: tokio::sync::Mutex<EvictionScheduler>,
    operation_timeout: Option<Duration>,
}

impl<S: BackingStore> CachedStore<S> {
    /// Create a manager with a fresh cache built from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache configuration fails validation.
    pub fn new(store: S, config: CacheConfig) -> VasariResult<Self> {
        let cache = TimedCache::new(config)?;
        Ok(Self::with_cache(store, cache))
    }

    /// Create a manager around an already-built cache.
    ///
    /// Use this to install a custom clock or metrics hook on the cache
    /// before handing it over.
    pub fn with_cache(store: S, cache: TimedCache<S::Entity>) -> Self {
        Self {
            cache: Arc::new(cache),
            store: Arc::new(store),
            locks: KeyedLocks::new(),
            scheduler: tokio::sync::Mutex::new(EvictionScheduler::new()),
            operation_timeout: None,
        }
    }

    /// Bound every backing-store call with a deadline.
    ///
    /// An elapsed deadline surfaces as a `Timeout` store error. No
    /// timeout is applied by default.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Handle to the underlying cache.
    pub fn cache(&self) -> &Arc<TimedCache<S::Entity>> {
        &self.cache
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Look up an entity, reading through to the store on a cache miss.
    ///
    /// A successful store fetch is inserted into the cache before
    /// returning. Absence in both layers is `Ok(None)`.
    #[tracing::instrument(skip(self), fields(key = ?key))]
    pub async fn get(&self, key: &KeyOf<S>) -> VasariResult<Option<S::Entity>> {
        if let Some(entity) = self.cache.get(key) {
            return Ok(Some(entity));
        }

        let fetched = self.bounded(self.store.fetch(key)).await?;
        if let Some(entity) = &fetched {
            self.cache.put(entity.clone());
            tracing::debug!("Cache miss filled from store");
        }
        Ok(fetched)
    }

    /// Look up an entity, creating it in the store when absent.
    ///
    /// `defaults` builds the entity to persist on first sight of the
    /// key; it must produce an entity whose [`Entity::key`] equals
    /// `key`. Under concurrent callers, at most one creation is in
    /// flight per key: the winner persists, the losers re-check the
    /// cache and adopt the winner's entity. A `DuplicateKey` from the
    /// store (a racing writer outside this process) is resolved with a
    /// single re-fetch.
    #[tracing::instrument(skip(self, defaults), fields(key = ?key))]
    pub async fn get_or_create<F>(&self, key: &KeyOf<S>, defaults: F) -> VasariResult<S::Entity>
    where
        F: FnOnce() -> S::Entity + Send,
    {
        if let Some(entity) = self.cache.get(key) {
            return Ok(entity);
        }

        let guard = self.locks.acquire(key.clone()).await;

        // a racing caller may have filled the cache while we waited
        let result = if let Some(entity) = self.cache.get(key) {
            Ok(entity)
        } else {
            self.fetch_or_create(key, defaults).await
        };

        drop(guard);
        self.locks.prune(key);
        result
    }

    /// Persist an entity and refresh the cache with it.
    #[tracing::instrument(skip(self, entity))]
    pub async fn put(&self, entity: S::Entity) -> VasariResult<S::Entity> {
        let updated = self.bounded(self.store.update(entity)).await?;
        self.cache.put(updated.clone());
        Ok(updated)
    }

    /// Remove an entity from the store and drop it from the cache.
    #[tracing::instrument(skip(self), fields(key = ?key))]
    pub async fn delete(&self, key: &KeyOf<S>) -> VasariResult<()> {
        self.bounded(self.store.delete(key)).await?;
        self.cache.pop(key);
        Ok(())
    }

    /// Drop an entity from the cache only.
    ///
    /// The next read for the key falls through to the store. Used when
    /// an upstream event invalidates the cached copy.
    pub fn evict(&self, key: &KeyOf<S>) -> Option<S::Entity> {
        self.cache.pop(key)
    }

    /// Bulk-load every persisted entity into the cache.
    ///
    /// Intended for startup. Capacity is enforced during the load, so
    /// pre-populating from a table larger than the cache is safe.
    /// Returns the number of entities fetched.
    #[tracing::instrument(skip(self))]
    pub async fn preload(&self) -> VasariResult<usize> {
        let all = self.bounded(self.store.fetch_all()).await?;
        let fetched = all.len();
        self.cache.insert_many(all);
        tracing::info!(fetched, cached = self.cache.len(), "Preloaded cache");
        Ok(fetched)
    }

    /// Start the periodic sweep at the cache's configured interval.
    pub async fn start_scheduler(&self) {
        let period = self.cache.config().sweep_interval();
        self.scheduler.lock().await.start(self.cache.clone(), period);
    }

    /// Stop the periodic sweep, waiting for an in-flight sweep to finish.
    pub async fn stop_scheduler(&self) {
        self.scheduler.lock().await.stop().await;
    }

    /// Store consultation for a key the cache does not hold, with the
    /// single-flight lock for the key already held.
    async fn fetch_or_create<F>(&self, key: &KeyOf<S>, defaults: F) -> VasariResult<S::Entity>
    where
        F: FnOnce() -> S::Entity + Send,
    {
        let entity = match self.bounded(self.store.fetch(key)).await? {
            Some(entity) => entity,
            None => {
                let candidate = defaults();
                debug_assert_eq!(candidate.key(), *key, "defaults produced a foreign key");
                match self.bounded(self.store.create(candidate)).await {
                    Ok(entity) => {
                        tracing::debug!("Created missing entity");
                        entity
                    }
                    Err(err) if err.is_duplicate_key() => {
                        // a racing writer beat us to the row; adopt theirs
                        tracing::debug!("Creation lost a race, re-fetching");
                        self.bounded(self.store.fetch(key)).await?.ok_or_else(|| {
                            StoreError::new(StoreErrorKind::Unavailable(format!(
                                "row for {key:?} vanished after duplicate-key create"
                            )))
                        })?
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        self.cache.put(entity.clone());
        Ok(entity)
    }

    /// Apply the configured deadline to a store call.
    async fn bounded<T, Fut>(&self, op: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, op).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::new(StoreErrorKind::Timeout(format!(
                    "store call exceeded {}ms",
                    limit.as_millis()
                )))),
            },
            None => op.await,
        }
    }
}
