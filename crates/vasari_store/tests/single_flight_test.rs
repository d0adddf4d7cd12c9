//! Tests for at-most-one creation under concurrent callers.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vasari_cache::CacheConfig;
use vasari_core::Entity;
use vasari_error::{StoreError, StoreErrorKind};
use vasari_store::{BackingStore, CachedStore, MemoryStore, StoreResult};

#[derive(Debug, Clone, PartialEq)]
struct GuildSettings {
    guild_id: u64,
    prefix: String,
}

impl Entity for GuildSettings {
    type Key = u64;

    fn key(&self) -> u64 {
        self.guild_id
    }
}

fn settings(guild_id: u64, prefix: &str) -> GuildSettings {
    GuildSettings {
        guild_id,
        prefix: prefix.to_string(),
    }
}

/// Store with slow fetches and counted creations, to widen the race
/// window between concurrent `get_or_create` callers.
struct SlowCountingStore {
    inner: MemoryStore<GuildSettings>,
    creates: Arc<AtomicU32>,
}

#[async_trait]
impl BackingStore for SlowCountingStore {
    type Entity = GuildSettings;

    async fn fetch(&self, key: &u64) -> StoreResult<Option<GuildSettings>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.inner.fetch(key).await
    }

    async fn create(&self, entity: GuildSettings) -> StoreResult<GuildSettings> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(entity).await
    }

    async fn update(&self, entity: GuildSettings) -> StoreResult<GuildSettings> {
        self.inner.update(entity).await
    }

    async fn delete(&self, key: &u64) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn fetch_all(&self) -> StoreResult<Vec<GuildSettings>> {
        self.inner.fetch_all().await
    }
}

/// Store simulating a racing external writer: the first fetch misses,
/// creation always loses to a unique-constraint conflict, and the
/// re-fetch observes the winner's row.
struct LostRaceStore {
    winner: GuildSettings,
    fetches: Arc<AtomicU32>,
}

#[async_trait]
impl BackingStore for LostRaceStore {
    type Entity = GuildSettings;

    async fn fetch(&self, _key: &u64) -> StoreResult<Option<GuildSettings>> {
        if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(None)
        } else {
            Ok(Some(self.winner.clone()))
        }
    }

    async fn create(&self, entity: GuildSettings) -> StoreResult<GuildSettings> {
        Err(StoreError::new(StoreErrorKind::DuplicateKey(format!(
            "guild {}",
            entity.guild_id
        ))))
    }

    async fn update(&self, entity: GuildSettings) -> StoreResult<GuildSettings> {
        Ok(entity)
    }

    async fn delete(&self, _key: &u64) -> StoreResult<()> {
        Ok(())
    }

    async fn fetch_all(&self) -> StoreResult<Vec<GuildSettings>> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn test_concurrent_callers_create_once() {
    let creates = Arc::new(AtomicU32::new(0));
    let store = SlowCountingStore {
        inner: MemoryStore::new(),
        creates: creates.clone(),
    };
    let manager = Arc::new(
        CachedStore::new(store, CacheConfig::default().with_capacity(10)).expect("valid config"),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.get_or_create(&99, || settings(99, "!")).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(creates.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|entity| entity == &results[0]));
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_on_distinct_keys_proceed_independently() {
    let creates = Arc::new(AtomicU32::new(0));
    let store = SlowCountingStore {
        inner: MemoryStore::new(),
        creates: creates.clone(),
    };
    let manager = Arc::new(
        CachedStore::new(store, CacheConfig::default().with_capacity(10)).expect("valid config"),
    );

    let mut handles = Vec::new();
    for id in 0..4u64 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.get_or_create(&id, move || settings(id, "!")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(creates.load(Ordering::SeqCst), 4);
    assert_eq!(manager.len(), 4);
}

#[tokio::test]
async fn test_lost_creation_race_adopts_winner() {
    let winner = settings(99, "winner");
    let store = LostRaceStore {
        winner: winner.clone(),
        fetches: Arc::new(AtomicU32::new(0)),
    };
    let manager = CachedStore::new(store, CacheConfig::default().with_capacity(10))
        .expect("valid config");

    let resolved = manager
        .get_or_create(&99, || settings(99, "loser"))
        .await
        .unwrap();

    assert_eq!(resolved, winner);
    // exactly one cached entry for the key, holding the winner's row
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.cache().get(&99), Some(winner));
}
