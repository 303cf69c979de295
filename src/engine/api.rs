// src/engine/api.rs
// Request/response types for the engine's narrow surface. Transport
// (HTTP verbs, status mapping, upload plumbing) lives outside this crate.

use crate::models::common::{ContentKind, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// What the creator supplies as content. Inline bodies are sealed before
/// they touch the store; blob uploads happen out of band and arrive here as
/// an object key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSource {
    Inline { kind: ContentKind, body: String },
    Redirect { target_url: String },
    Blob { object_key: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct QuizSpec {
    #[validate(length(min = 1, max = 300))]
    pub question: String,
    #[validate(length(min = 1, max = 120))]
    pub answer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    pub content: ContentSource,

    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,

    #[validate(nested)]
    pub quiz: Option<QuizSpec>,

    pub unlock_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,

    #[validate(range(min = 1))]
    pub view_limit: Option<u32>,
}

/// Returned once, at creation. The owner token is the only way to read
/// stats or delete the item later; it is never retrievable again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedItem {
    pub short_id: String,
    pub secondary_id: String,
    pub owner_token: String,
    pub created_at: Timestamp,
}

/// Credentials a consumer supplies when resolving an item.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResolveCredentials {
    pub password: Option<String>,
    pub quiz_answer: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedContent {
    Inline { kind: ContentKind, body: String },
    Redirect { target_url: String },
    Blob { object_key: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub name: String,
    pub content: ResolvedContent,
}

/// Owner-facing usage analytics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemStats {
    pub short_id: String,
    pub name: String,
    pub view_count: u32,
    pub view_limit: Option<u32>,
    pub unlock_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
