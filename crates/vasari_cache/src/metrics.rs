//! Cache access metrics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Observer of cache activity.
///
/// Every method has an empty default body, so implementors opt into the
/// events they care about. Hooks are purely observational: the cache
/// behaves identically whether or not one is installed.
pub trait MetricsHook: Send + Sync {
    /// A `get` found the key.
    fn hit(&self) {}

    /// A `get` missed.
    fn miss(&self) {}

    /// Capacity pressure evicted the oldest entry.
    fn eviction(&self) {}

    /// A sweep cycle removed `count` stale entries.
    fn sweep_removed(&self, _count: usize) {}
}

/// Hook that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsHook for NoopMetrics {}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Successful lookups
    pub hits: u64,
    /// Failed lookups
    pub misses: u64,
    /// Entries removed by capacity pressure
    pub evictions: u64,
    /// Entries removed by staleness sweeps
    pub swept: u64,
}

impl MetricsSnapshot {
    /// Fraction of lookups that hit, or `None` before any lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}

/// Atomic-counter metrics hook.
///
/// Counters only ever increase; read them with [`CacheMetrics::snapshot`].
///
/// # Examples
///
/// ```
/// use vasari_cache::{CacheMetrics, MetricsHook};
///
/// let metrics = CacheMetrics::new();
/// metrics.hit();
/// metrics.miss();
/// assert_eq!(metrics.snapshot().hit_ratio(), Some(0.5));
/// ```
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    swept: AtomicU64,
}

impl CacheMetrics {
    /// Create a hook with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all counters at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

impl MetricsHook for CacheMetrics {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn sweep_removed(&self, count: usize) {
        self.swept.fetch_add(count as u64, Ordering::Relaxed);
    }
}
