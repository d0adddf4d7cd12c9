//! In-memory reference store.

use crate::{BackingStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vasari_core::Entity;
use vasari_error::{StoreError, StoreErrorKind};

/// A basic in-memory backing store.
///
/// Used by tests and development setups that want the full orchestration
/// stack without a database. Clones share the same underlying map.
#[derive(Debug)]
pub struct MemoryStore<E: Entity> {
    rows: Arc<RwLock<HashMap<E::Key, E>>>,
}

impl<E: Entity> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<E: Entity> MemoryStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of persisted rows.
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> BackingStore for MemoryStore<E> {
    type Entity = E;

    async fn fetch(&self, key: &E::Key) -> StoreResult<Option<E>> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn create(&self, entity: E) -> StoreResult<E> {
        let mut rows = self.rows.write().await;
        let key = entity.key();
        if rows.contains_key(&key) {
            return Err(StoreError::new(StoreErrorKind::DuplicateKey(format!(
                "{key:?}"
            ))));
        }
        rows.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> StoreResult<E> {
        let mut rows = self.rows.write().await;
        rows.insert(entity.key(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> StoreResult<()> {
        self.rows.write().await.remove(key);
        Ok(())
    }

    async fn fetch_all(&self) -> StoreResult<Vec<E>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }
}
