//! The cached value contract.

use std::fmt::Debug;
use std::hash::Hash;

/// A cacheable domain value with a stable identity.
///
/// Implementors promise that [`Entity::key`] returns the same value for the
/// lifetime of the entity: once inserted under a key, an entity's identity
/// must not change while cached. There are no other inherent invariants.
///
/// The key must be `Ord` so that eviction tie-breaks are deterministic.
///
/// # Examples
///
/// ```
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
///
///     fn key(&self) -> u64 {
///         self.guild_id
///     }
/// }
/// ```
pub trait Entity: Clone + Send + Sync + 'static {
    /// Key type used to index the entity.
    type Key: Clone + Eq + Hash + Ord + Debug + Send + Sync + 'static;

    /// Stable identity of this entity.
    fn key(&self) -> Self::Key;
}
