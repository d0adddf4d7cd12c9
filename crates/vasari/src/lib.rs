//! Vasari - Bounded Entity Caching
//!
//! Vasari keeps a bot's hot per-entity lookups (guild settings, user
//! profiles, command prefixes) out of the database: a capacity-bounded
//! in-memory cache with LRU-by-timestamp eviction and a scheduled
//! staleness sweep, orchestrated in front of an authoritative backing
//! store.
//!
//! # Features
//!
//! - **Bounded cache**: at most `capacity` entries, evicting the
//!   longest-unread entry under pressure
//! - **Staleness sweep**: periodic removal of aged-out entries, gated on
//!   a high-water mark so an idle cache costs nothing
//! - **Read-through / write-through**: misses consult the store, writes
//!   land in both layers
//! - **Single-flight creation**: concurrent `get_or_create` callers for
//!   one key resolve to one persisted row
//! - **Deterministic time**: a clock abstraction makes every
//!   time-dependent property testable
//!
//! # Quick Start
//!
//! ```rust
//! use vasari::{CacheConfig, CachedStore, Entity, MemoryStore};
//!
//! #[derive(Debug, Clone)]
//! struct GuildSettings {
//!     guild_id: u64,
//!     prefix: String,
//! }
//!
//! impl Entity for GuildSettings {
//!     type Key = u64;
//!     fn key(&self) -> u64 {
//!         self.guild_id
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let manager = CachedStore::new(store, CacheConfig::default())?;
//!     manager.start_scheduler().await;
//!
//!     let settings = manager
//!         .get_or_create(&42, || GuildSettings {
//!             guild_id: 42,
//!             prefix: "!".to_string(),
//!         })
//!         .await?;
//!     assert_eq!(settings.prefix, "!");
//!
//!     manager.stop_scheduler().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Vasari is organized as a workspace with focused crates:
//!
//! - `vasari_error` - Error types
//! - `vasari_core` - Entity and clock contracts
//! - `vasari_cache` - The bounded timed cache, metrics, and sweep
//!   scheduler
//! - `vasari_store` - Backing store interface and the cached-store
//!   manager
//!
//! This crate (`vasari`) re-exports everything for convenience.

#![warn(missing_docs)]

pub use vasari_cache::{
    CacheConfig, CacheConfigBuilder, CacheEntry, CacheMetrics, EvictionScheduler, MetricsHook,
    MetricsSnapshot, NoopMetrics, TimedCache,
};
pub use vasari_core::{init_telemetry, Clock, Entity, ManualClock, SystemClock};
pub use vasari_error::{
    CacheError, CacheErrorKind, ConfigError, StoreError, StoreErrorKind, VasariError,
    VasariErrorKind, VasariResult,
};
pub use vasari_store::{BackingStore, CachedStore, KeyedLocks, MemoryStore, StoreResult};
