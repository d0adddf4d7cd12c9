//! The authoritative store contract.

use async_trait::async_trait;
use vasari_core::Entity;
use vasari_error::StoreError;

/// Result type for backing store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The slower, durable data source the cache fronts.
///
/// Implementations wrap a relational database, a key-value service, or an
/// in-memory map for tests and development. The cache layer treats the
/// store as an opaque, independently synchronized async dependency: it
/// never manages the store's concurrency and never retries its failures.
///
/// Absence is reported through `Option`, never as an error. The only
/// error shapes are `Unavailable` (outage), `DuplicateKey` (a racing
/// creation won; re-fetch to observe it), and `Timeout` (applied one
/// layer up).
#[async_trait]
pub trait BackingStore: Send + Sync + 'static {
    /// The entity type this store persists.
    type Entity: Entity;

    /// Look up an entity by key.
    async fn fetch(
        &self,
        key: &<Self::Entity as Entity>::Key,
    ) -> StoreResult<Option<Self::Entity>>;

    /// Persist a new entity.
    ///
    /// Creation is idempotent at the store level: when a row for the
    /// entity's key already exists, the call fails with `DuplicateKey`
    /// and the caller re-fetches the surviving row.
    async fn create(&self, entity: Self::Entity) -> StoreResult<Self::Entity>;

    /// Persist the full state of an entity, inserting when absent.
    async fn update(&self, entity: Self::Entity) -> StoreResult<Self::Entity>;

    /// Remove an entity. Removing an absent key succeeds.
    async fn delete(&self, key: &<Self::Entity as Entity>::Key) -> StoreResult<()>;

    /// All persisted entities, for startup pre-population.
    async fn fetch_all(&self) -> StoreResult<Vec<Self::Entity>>;
}
