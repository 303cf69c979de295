// src/engine/models/item.rs
use crate::models::common::{ContentKind, InternalId, Timestamp};
use serde::{Deserialize, Serialize};

/// What an item points at. Inline bodies are stored as a sealed envelope
/// (see `utils::crypto`); blob and redirect variants only carry a reference.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentRef {
    Blob { object_key: String },
    Redirect { target_url: String },
    Inline { kind: ContentKind, body: String },
}

/// The unit of sharing: one piece of content behind a short identifier and
/// a set of independently composable access gates.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Item {
    // Store-assigned primary key, not exposed through the API
    #[serde(skip_serializing, default)]
    pub internal_id: InternalId,

    pub short_id: String,
    pub secondary_id: String,
    pub name: String,
    pub content: ContentRef,

    // Gates, each optional. Immutable once the item is created.
    pub password_hash: Option<String>,
    pub quiz_question: Option<String>,
    pub quiz_answer_hash: Option<String>,
    pub unlock_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub view_limit: Option<u32>,

    // Authoritative consumption counter. Only ever moves up, and only via
    // the store's conditional increment.
    pub view_count: u32,

    // Capability secret returned to the creator; the only authorization
    // identity in the system.
    pub owner_token: String,

    pub created_at: Timestamp,
}

impl Item {
    /// Whether retiring this item requires releasing an external blob.
    pub fn blob_key(&self) -> Option<&str> {
        match &self.content {
            ContentRef::Blob { object_key } => Some(object_key),
            _ => None,
        }
    }
}
