// src/engine/services/allocator.rs
// Collision-safe public identifier allocation.

use crate::config::EngineConfig;
use crate::error::ShareError;
use crate::models::common::IdDomain;
use crate::storage::ItemStore;
use crate::utils::rng;
use tracing::warn;

/// Allocates a fresh identifier in the given uniqueness domain.
///
/// Candidates are random draws; the store's existence check, not an
/// in-process lock, is the source of truth for uniqueness, so a candidate
/// taken by a concurrent caller is just an ordinary collision and gets
/// retried. Exhausting the attempt budget signals keyspace pressure
/// (`CapacityExhausted`), which callers surface as a retryable condition.
pub async fn allocate_id(
    store: &dyn ItemStore,
    domain: IdDomain,
    config: &EngineConfig,
) -> Result<String, ShareError> {
    for attempt in 1..=config.max_id_attempts {
        let candidate = rng::short_code(config.short_id_length);
        let taken = match domain {
            IdDomain::Short => store.find_by_short_id(&candidate).await?.is_some(),
            IdDomain::Secondary => store.find_by_secondary_id(&candidate).await?.is_some(),
        };
        if !taken {
            return Ok(candidate);
        }
        warn!(?domain, attempt, "identifier collision, retrying with a fresh candidate");
    }
    Err(ShareError::CapacityExhausted(format!(
        "no free {:?} identifier after {} attempts",
        domain, config.max_id_attempts
    )))
}
