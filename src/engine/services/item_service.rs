// src/engine/services/item_service.rs
// Creation and resolution orchestration, owner analytics and deletion.

use crate::{
    api::{
        ContentSource, CreateItemRequest, CreatedItem, ItemStats, ResolveCredentials,
        ResolvedContent, ResolvedItem,
    },
    config::EngineConfig,
    error::ShareError,
    models::{
        common::{IdDomain, Timestamp},
        item::{ContentRef, Item},
    },
    services::allocator,
    storage::{BlobStore, ItemStore},
    utils::{crypto, guards, rng, time},
};
use tracing::{info, warn};
use validator::Validate;

/// Creates a new item behind freshly allocated identifiers.
///
/// Inline bodies are sealed before insertion, so plaintext never reaches
/// the store; a missing master secret fails the request fast with
/// `ConfigurationMissing`. Password and quiz answers are stored only as
/// one-way hashes.
pub async fn create_item(
    store: &dyn ItemStore,
    config: &EngineConfig,
    request: CreateItemRequest,
) -> Result<CreatedItem, ShareError> {
    request
        .validate()
        .map_err(|e| ShareError::ValidationError(e.to_string()))?;
    let now = time::now_ts();
    validate_schedule(&request, now)?;

    let content = prepare_content(config, request.content)?;
    let password_hash = request.password.as_deref().map(crypto::hash_credential);
    let (quiz_question, quiz_answer_hash) = match request.quiz {
        Some(quiz) => (
            Some(quiz.question),
            Some(crypto::hash_credential(&crypto::normalize_answer(
                &quiz.answer,
            ))),
        ),
        None => (None, None),
    };

    let short_id = allocator::allocate_id(store, IdDomain::Short, config).await?;
    let secondary_id = allocator::allocate_id(store, IdDomain::Secondary, config).await?;
    let owner_token = rng::generate_owner_token();

    let item = Item {
        internal_id: 0, // assigned by the store
        short_id,
        secondary_id,
        name: request.name,
        content,
        password_hash,
        quiz_question,
        quiz_answer_hash,
        unlock_at: request.unlock_at,
        expires_at: request.expires_at,
        view_limit: request.view_limit,
        view_count: 0,
        owner_token: owner_token.clone(),
        created_at: now,
    };
    let stored = store.insert(item).await?;

    info!(short_id = %stored.short_id, "item created");
    Ok(CreatedItem {
        short_id: stored.short_id,
        secondary_id: stored.secondary_id,
        owner_token,
        created_at: stored.created_at,
    })
}

/// Resolves an item by its public short id.
pub async fn resolve_item(
    store: &dyn ItemStore,
    config: &EngineConfig,
    short_id: &str,
    credentials: &ResolveCredentials,
) -> Result<ResolvedItem, ShareError> {
    let item = store
        .find_by_short_id(short_id)
        .await?
        .ok_or_else(|| ShareError::NotFound(short_id.to_string()))?;
    resolve_loaded(store, config, item, credentials).await
}

/// Resolves an item by its secondary id (the scan-artifact path).
pub async fn resolve_by_secondary_id(
    store: &dyn ItemStore,
    config: &EngineConfig,
    secondary_id: &str,
    credentials: &ResolveCredentials,
) -> Result<ResolvedItem, ShareError> {
    let item = store
        .find_by_secondary_id(secondary_id)
        .await?
        .ok_or_else(|| ShareError::NotFound(secondary_id.to_string()))?;
    resolve_loaded(store, config, item, credentials).await
}

/// Owner analytics. The owner token is the only authorization identity.
pub async fn item_stats(
    store: &dyn ItemStore,
    short_id: &str,
    owner_token: &str,
) -> Result<ItemStats, ShareError> {
    let item = store
        .find_by_short_id(short_id)
        .await?
        .ok_or_else(|| ShareError::NotFound(short_id.to_string()))?;
    check_owner(&item, owner_token)?;
    Ok(ItemStats {
        short_id: item.short_id,
        name: item.name,
        view_count: item.view_count,
        view_limit: item.view_limit,
        unlock_at: item.unlock_at,
        expires_at: item.expires_at,
        created_at: item.created_at,
    })
}

/// Owner-authorized deletion. The external blob is released best-effort;
/// a release failure is logged but never blocks removing the record.
pub async fn delete_item(
    store: &dyn ItemStore,
    blobs: &dyn BlobStore,
    short_id: &str,
    owner_token: &str,
) -> Result<(), ShareError> {
    let item = store
        .find_by_short_id(short_id)
        .await?
        .ok_or_else(|| ShareError::NotFound(short_id.to_string()))?;
    check_owner(&item, owner_token)?;

    if let Some(object_key) = item.blob_key() {
        if let Err(e) = blobs.release(object_key).await {
            warn!(short_id = %item.short_id, error = %e, "blob release failed during owner delete");
        }
    }
    store.delete(item.internal_id).await?;
    info!(short_id = %item.short_id, "item deleted by owner");
    Ok(())
}

async fn resolve_loaded(
    store: &dyn ItemStore,
    config: &EngineConfig,
    item: Item,
    credentials: &ResolveCredentials,
) -> Result<ResolvedItem, ShareError> {
    let now = time::now_ts();
    guards::evaluate_access(&item, credentials, now)?;

    // The gate's quota check was only a pre-check; this conditional
    // increment is the atomic, authoritative decision.
    let consumed = store
        .conditional_increment_view_count(item.internal_id)
        .await?;
    if !consumed {
        return Err(ShareError::QuotaExhausted);
    }

    let content = open_content(config, &item)?;
    Ok(ResolvedItem {
        name: item.name,
        content,
    })
}

fn open_content(config: &EngineConfig, item: &Item) -> Result<ResolvedContent, ShareError> {
    match &item.content {
        ContentRef::Redirect { target_url } => Ok(ResolvedContent::Redirect {
            target_url: target_url.clone(),
        }),
        ContentRef::Blob { object_key } => Ok(ResolvedContent::Blob {
            object_key: object_key.clone(),
        }),
        ContentRef::Inline { kind, body } => {
            // Records written before envelope sealing was introduced carry
            // a plain body; pass those through unchanged.
            let body = if crypto::looks_sealed(body) {
                crypto::open(config.master_secret()?, body)?
            } else {
                body.clone()
            };
            Ok(ResolvedContent::Inline { kind: *kind, body })
        }
    }
}

fn check_owner(item: &Item, owner_token: &str) -> Result<(), ShareError> {
    if item.owner_token != owner_token {
        return Err(ShareError::NotAuthorized(
            "owner token does not match".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedule(request: &CreateItemRequest, now: Timestamp) -> Result<(), ShareError> {
    if let Some(expires_at) = request.expires_at {
        if expires_at <= now {
            return Err(ShareError::ValidationError(
                "expires_at must be in the future".to_string(),
            ));
        }
        if let Some(unlock_at) = request.unlock_at {
            if unlock_at >= expires_at {
                return Err(ShareError::ValidationError(
                    "unlock_at must precede expires_at".to_string(),
                ));
            }
        }
    }
    match &request.content {
        ContentSource::Redirect { target_url } if !target_url.contains("://") => {
            Err(ShareError::ValidationError(
                "redirect target must be an absolute URL".to_string(),
            ))
        }
        ContentSource::Blob { object_key } if object_key.is_empty() => Err(
            ShareError::ValidationError("blob object key must not be empty".to_string()),
        ),
        _ => Ok(()),
    }
}

fn prepare_content(
    config: &EngineConfig,
    source: ContentSource,
) -> Result<ContentRef, ShareError> {
    match source {
        ContentSource::Redirect { target_url } => Ok(ContentRef::Redirect { target_url }),
        ContentSource::Blob { object_key } => Ok(ContentRef::Blob { object_key }),
        ContentSource::Inline { kind, body } => {
            let sealed = crypto::seal(config.master_secret()?, &body)?;
            Ok(ContentRef::Inline { kind, body: sealed })
        }
    }
}
