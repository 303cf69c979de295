// src/engine/storage/memory.rs
// In-memory reference implementation of the store contracts. The primary
// map plus two secondary identifier indexes sit behind one mutex, which is
// what makes the conditional view-count increment atomic here.

use crate::error::ShareError;
use crate::models::common::{InternalId, Timestamp};
use crate::models::item::Item;
use crate::storage::{BlobStore, ItemStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct StoreState {
    next_internal_id: InternalId,
    // Primary storage: internal id -> item
    items: BTreeMap<InternalId, Item>,
    // Secondary indexes: public identifier -> internal id
    short_index: BTreeMap<String, InternalId>,
    secondary_index: BTreeMap<String, InternalId>,
}

#[derive(Default)]
pub struct InMemoryItemStore {
    state: Mutex<StoreState>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, ShareError> {
        self.state
            .lock()
            .map_err(|_| ShareError::StorageError("item store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<Item>, ShareError> {
        let state = self.state()?;
        Ok(state
            .short_index
            .get(short_id)
            .and_then(|id| state.items.get(id))
            .cloned())
    }

    async fn find_by_secondary_id(&self, secondary_id: &str) -> Result<Option<Item>, ShareError> {
        let state = self.state()?;
        Ok(state
            .secondary_index
            .get(secondary_id)
            .and_then(|id| state.items.get(id))
            .cloned())
    }

    async fn insert(&self, mut item: Item) -> Result<Item, ShareError> {
        let mut state = self.state()?;
        if state.short_index.contains_key(&item.short_id) {
            return Err(ShareError::StorageError(format!(
                "short id {} already in use",
                item.short_id
            )));
        }
        if state.secondary_index.contains_key(&item.secondary_id) {
            return Err(ShareError::StorageError(format!(
                "secondary id {} already in use",
                item.secondary_id
            )));
        }

        let internal_id = state
            .next_internal_id
            .checked_add(1)
            .ok_or_else(|| ShareError::Internal("item id counter overflow".to_string()))?;
        state.next_internal_id = internal_id;
        item.internal_id = internal_id;

        state.short_index.insert(item.short_id.clone(), internal_id);
        state
            .secondary_index
            .insert(item.secondary_id.clone(), internal_id);
        state.items.insert(internal_id, item.clone());
        Ok(item)
    }

    async fn conditional_increment_view_count(
        &self,
        internal_id: u64,
    ) -> Result<bool, ShareError> {
        let mut state = self.state()?;
        let item = state
            .items
            .get_mut(&internal_id)
            .ok_or_else(|| ShareError::NotFound(internal_id.to_string()))?;
        match item.view_limit {
            Some(limit) if item.view_count >= limit => Ok(false),
            _ => {
                item.view_count += 1;
                Ok(true)
            }
        }
    }

    async fn delete(&self, internal_id: u64) -> Result<(), ShareError> {
        let mut state = self.state()?;
        let item = state
            .items
            .remove(&internal_id)
            .ok_or_else(|| ShareError::NotFound(internal_id.to_string()))?;
        state.short_index.remove(&item.short_id);
        state.secondary_index.remove(&item.secondary_id);
        Ok(())
    }

    async fn list_expired(&self, now: Timestamp) -> Result<Vec<Item>, ShareError> {
        let state = self.state()?;
        Ok(state
            .items
            .values()
            .filter(|item| item.expires_at.map_or(false, |at| now > at))
            .cloned()
            .collect())
    }

    async fn list_over_quota(&self) -> Result<Vec<Item>, ShareError> {
        let state = self.state()?;
        Ok(state
            .items
            .values()
            .filter(|item| item.view_limit.map_or(false, |limit| item.view_count >= limit))
            .cloned()
            .collect())
    }
}

/// Records released object keys instead of talking to real object storage.
#[derive(Default)]
pub struct InMemoryBlobStore {
    released: Mutex<Vec<String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn released(&self) -> Vec<String> {
        self.released
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn release(&self, object_key: &str) -> Result<(), ShareError> {
        self.released
            .lock()
            .map_err(|_| ShareError::StorageError("blob store mutex poisoned".to_string()))?
            .push(object_key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::ContentKind;
    use crate::models::item::ContentRef;
    use futures::future::join_all;
    use std::sync::Arc;

    fn item(short_id: &str, secondary_id: &str) -> Item {
        Item {
            internal_id: 0,
            short_id: short_id.to_string(),
            secondary_id: secondary_id.to_string(),
            name: "note".to_string(),
            content: ContentRef::Inline {
                kind: ContentKind::Text,
                body: "body".to_string(),
            },
            password_hash: None,
            quiz_question: None,
            quiz_answer_hash: None,
            unlock_at: None,
            expires_at: None,
            view_limit: None,
            view_count: 0,
            owner_token: "token".to_string(),
            created_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_indexes_both_domains() {
        let store = InMemoryItemStore::new();
        let stored = store.insert(item("abc1234", "xyz9876")).await.unwrap();
        assert!(stored.internal_id > 0);

        let by_short = store.find_by_short_id("abc1234").await.unwrap().unwrap();
        assert_eq!(by_short.internal_id, stored.internal_id);
        let by_secondary = store.find_by_secondary_id("xyz9876").await.unwrap().unwrap();
        assert_eq!(by_secondary.internal_id, stored.internal_id);

        assert!(store.find_by_short_id("xyz9876").await.unwrap().is_none());
        assert!(store.find_by_secondary_id("abc1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_public_ids_are_rejected() {
        let store = InMemoryItemStore::new();
        store.insert(item("abc1234", "xyz9876")).await.unwrap();
        assert!(store.insert(item("abc1234", "other11")).await.is_err());
        assert!(store.insert(item("other11", "xyz9876")).await.is_err());
    }

    #[tokio::test]
    async fn unlimited_items_always_increment() {
        let store = InMemoryItemStore::new();
        let stored = store.insert(item("abc1234", "xyz9876")).await.unwrap();
        for _ in 0..10 {
            assert!(store
                .conditional_increment_view_count(stored.internal_id)
                .await
                .unwrap());
        }
        let reread = store.find_by_short_id("abc1234").await.unwrap().unwrap();
        assert_eq!(reread.view_count, 10);
    }

    #[tokio::test]
    async fn increment_of_missing_item_is_not_found() {
        let store = InMemoryItemStore::new();
        let err = store.conditional_increment_view_count(42).await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn last_view_slot_is_consumed_exactly_once() {
        let store = Arc::new(InMemoryItemStore::new());
        let mut single_use = item("abc1234", "xyz9876");
        single_use.view_limit = Some(1);
        let stored = store.insert(single_use).await.unwrap();

        let attempts = (0..50).map(|_| {
            let store = Arc::clone(&store);
            let internal_id = stored.internal_id;
            tokio::spawn(async move {
                store
                    .conditional_increment_view_count(internal_id)
                    .await
                    .unwrap()
            })
        });
        let outcomes: Vec<bool> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(outcomes.iter().filter(|consumed| **consumed).count(), 1);
        assert_eq!(outcomes.iter().filter(|consumed| !**consumed).count(), 49);
        let reread = store.find_by_short_id("abc1234").await.unwrap().unwrap();
        assert_eq!(reread.view_count, 1);
    }

    #[tokio::test]
    async fn delete_removes_record_and_indexes() {
        let store = InMemoryItemStore::new();
        let stored = store.insert(item("abc1234", "xyz9876")).await.unwrap();
        store.delete(stored.internal_id).await.unwrap();
        assert!(store.find_by_short_id("abc1234").await.unwrap().is_none());
        assert!(store.find_by_secondary_id("xyz9876").await.unwrap().is_none());
        assert!(matches!(
            store.delete(stored.internal_id).await.unwrap_err(),
            ShareError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn expiry_and_quota_listings() {
        let store = InMemoryItemStore::new();
        let now = 1_700_000_000;

        let mut expired = item("expired1", "sec0001");
        expired.expires_at = Some(now - 10);
        store.insert(expired).await.unwrap();

        let mut exhausted = item("usedup11", "sec0002");
        exhausted.view_limit = Some(2);
        exhausted.view_count = 2;
        store.insert(exhausted).await.unwrap();

        let mut live = item("live0001", "sec0003");
        live.expires_at = Some(now + 1000);
        live.view_limit = Some(2);
        live.view_count = 1;
        store.insert(live).await.unwrap();

        let expired_ids: Vec<String> = store
            .list_expired(now)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.short_id)
            .collect();
        assert_eq!(expired_ids, vec!["expired1".to_string()]);

        let over_quota_ids: Vec<String> = store
            .list_over_quota()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.short_id)
            .collect();
        assert_eq!(over_quota_ids, vec!["usedup11".to_string()]);
    }
}
