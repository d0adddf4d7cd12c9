//! Bounded, time-aware entity caching.
//!
//! This crate provides the core caching infrastructure for per-entity
//! lookups (guild settings, user profiles, command prefixes) that would
//! otherwise hit the backing database on every event: a capacity-bounded
//! map with LRU-by-timestamp eviction, a high-water-gated staleness sweep,
//! and a periodic scheduler that runs the sweep without blocking
//! foreground traffic.

#![warn(missing_docs)]

mod cache;
mod config;
mod entry;
mod metrics;
mod scheduler;

pub use cache::TimedCache;
pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use metrics::{CacheMetrics, MetricsHook, MetricsSnapshot, NoopMetrics};
pub use scheduler::EvictionScheduler;
