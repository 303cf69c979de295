// src/engine/services/scheduler.rs
// Periodic lifecycle sweep: retires items whose lifecycle has ended and
// releases their external blobs. Purely a resource-reclamation pass; the
// access gate already denies expired and exhausted items on the request
// path, so the sweep is safe to run late or not at all.

use crate::config::EngineConfig;
use crate::error::ShareError;
use crate::models::common::Timestamp;
use crate::models::item::Item;
use crate::storage::{BlobStore, ItemStore};
use crate::utils::time;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Runs the sweep on a fixed interval until the task is dropped. Intended
/// to be spawned once per deployment next to the request handlers.
pub async fn run(
    store: Arc<dyn ItemStore>,
    blobs: Arc<dyn BlobStore>,
    config: EngineConfig,
) {
    let mut ticker = tokio::time::interval(config.sweep_interval);
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_once(
            store.as_ref(),
            blobs.as_ref(),
            time::now_ts(),
            config.blob_release_timeout,
        )
        .await
        {
            error!(error = %e, "lifecycle sweep failed to enumerate items");
        }
    }
}

/// One idempotent sweep: pass 1 retires items past their expiry, pass 2
/// retires items that exhausted their view quota. Every item is an
/// independent unit of work; one item's cleanup error never aborts the
/// rest of the pass.
pub async fn sweep_once(
    store: &dyn ItemStore,
    blobs: &dyn BlobStore,
    now: Timestamp,
    blob_release_timeout: Duration,
) -> Result<(), ShareError> {
    let expired = store.list_expired(now).await?;
    let expired_count = expired.len();
    for item in expired {
        retire_item(store, blobs, &item, blob_release_timeout).await;
    }

    let exhausted = store.list_over_quota().await?;
    let exhausted_count = exhausted.len();
    for item in exhausted {
        retire_item(store, blobs, &item, blob_release_timeout).await;
    }

    info!(expired_count, exhausted_count, "lifecycle sweep completed");
    Ok(())
}

/// Releases the item's external blob (best-effort, bounded by a timeout so
/// one stuck deletion cannot stall the pass) and then deletes the record.
async fn retire_item(
    store: &dyn ItemStore,
    blobs: &dyn BlobStore,
    item: &Item,
    blob_release_timeout: Duration,
) {
    if let Some(object_key) = item.blob_key() {
        match tokio::time::timeout(blob_release_timeout, blobs.release(object_key)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(short_id = %item.short_id, error = %e, "blob release failed, deleting record anyway");
            }
            Err(_) => {
                warn!(short_id = %item.short_id, "blob release timed out, deleting record anyway");
            }
        }
    }

    match store.delete(item.internal_id).await {
        Ok(()) => debug!(short_id = %item.short_id, "retired item"),
        // A concurrent owner delete or the other sweep pass got there first.
        Err(ShareError::NotFound(_)) => {
            debug!(short_id = %item.short_id, "item already gone, nothing to retire");
        }
        Err(e) => {
            warn!(short_id = %item.short_id, error = %e, "failed to delete retired item record");
        }
    }
}
