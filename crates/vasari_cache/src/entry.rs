//! Cache entry bookkeeping.

use std::time::{Duration, Instant};

/// A cached entity together with its last-access timestamp.
///
/// Entries are owned exclusively by the cache; callers receive clones of
/// the entity, never mutable access into the map. `last_access` is
/// monotonically non-decreasing: it advances on read or overwrite and is
/// never rewound.
#[derive(Debug, Clone)]
pub struct CacheEntry<E> {
    entity: E,
    last_access: Instant,
}

impl<E> CacheEntry<E> {
    /// Create an entry accessed at `now`.
    pub fn new(entity: E, now: Instant) -> Self {
        Self {
            entity,
            last_access: now,
        }
    }

    /// The cached entity.
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// When the entry was last read or written.
    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    /// Refresh the access timestamp.
    ///
    /// A `now` earlier than the current timestamp leaves the entry
    /// untouched, preserving monotonicity.
    pub fn touch(&mut self, now: Instant) {
        self.last_access = self.last_access.max(now);
    }

    /// Whether the entry has gone unread for longer than `threshold`.
    pub fn is_stale(&self, now: Instant, threshold: Duration) -> bool {
        now.saturating_duration_since(self.last_access) > threshold
    }

    /// Consume the entry, yielding the entity.
    pub fn into_entity(self) -> E {
        self.entity
    }
}
