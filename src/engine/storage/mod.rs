// src/engine/storage/mod.rs
// Collaborator contracts the engine is written against. The production
// implementations (SQL, object storage) live with the transport layer.

pub mod memory;

use crate::error::ShareError;
use crate::models::common::Timestamp;
use crate::models::item::Item;
use async_trait::async_trait;

pub use memory::{InMemoryBlobStore, InMemoryItemStore};

/// Durable record of items. The engine requires only read, conditional
/// write and delete semantics; identifier uniqueness is enforced here, not
/// by in-process locks.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<Item>, ShareError>;

    async fn find_by_secondary_id(&self, secondary_id: &str) -> Result<Option<Item>, ShareError>;

    /// Persists a new item, assigning its internal id. Fails if either
    /// public identifier is already in use.
    async fn insert(&self, item: Item) -> Result<Item, ShareError>;

    /// The single atomic read-check-increment for view consumption.
    /// Returns `Ok(true)` iff the increment happened under quota; unlimited
    /// items always increment and return `Ok(true)`. A missing item is
    /// `Err(NotFound)`.
    async fn conditional_increment_view_count(
        &self,
        internal_id: u64,
    ) -> Result<bool, ShareError>;

    /// Removes the record. `Err(NotFound)` if it is already gone.
    async fn delete(&self, internal_id: u64) -> Result<(), ShareError>;

    /// Items whose `expires_at` lies strictly before `now`.
    async fn list_expired(&self, now: Timestamp) -> Result<Vec<Item>, ShareError>;

    /// Items whose view count has reached their view limit.
    async fn list_over_quota(&self) -> Result<Vec<Item>, ShareError>;
}

/// Externally hosted object storage. Only reached for non-inline content;
/// release is best-effort from the engine's perspective.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn release(&self, object_key: &str) -> Result<(), ShareError>;
}
