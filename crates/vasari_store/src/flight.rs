//! Per-key in-flight operation locks.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-key async locks.
///
/// Holding the guard for a key makes the caller the single in-flight
/// operation for that key; concurrent callers for the same key queue on
/// the same lock while callers for other keys proceed untouched. This is
/// the single-flight mechanism behind `get_or_create`: losers of the
/// race wake up, re-check the cache, and find the winner's entry.
///
/// Locks are created on demand and pruned once no caller holds or waits
/// on them, so the registry does not grow with the keyspace.
pub struct KeyedLocks<K> {
    locks: StdMutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `key`, waiting behind any in-flight holder.
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the registry entry for `key` if nobody holds or waits on it.
    ///
    /// Call after releasing the guard returned by [`KeyedLocks::acquire`].
    pub fn prune(&self, key: &K) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(key) {
            // the map's Arc is the last reference once all guards are gone
            if Arc::strong_count(lock) == 1 {
                locks.remove(key);
            }
        }
    }

    /// Number of keys with a registered lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key has a registered lock.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
