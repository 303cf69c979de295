// src/engine/error.rs
use crate::models::common::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-wide error taxonomy. Gate denials are routine outcomes that
/// callers branch on; they carry only what is needed to prompt for the
/// right credential, never content.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Item has expired")]
    Expired,

    #[error("View quota exhausted")]
    QuotaExhausted,

    #[error("Item is locked until {0}")]
    Locked(Timestamp),

    #[error("Quiz answer missing or incorrect")]
    QuizFailed,

    #[error("A password is required to access this item")]
    PasswordRequired,

    #[error("Invalid password")]
    PasswordInvalid,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    // Identifier keyspace pressure during creation. Retryable, not a caller bug.
    #[error("Identifier capacity exhausted: {0}")]
    CapacityExhausted(String),

    // Covers both tampering and a wrong master secret; AES-GCM cannot tell
    // them apart and partial plaintext is never surfaced.
    #[error("Sealed content failed authentication: {0}")]
    EnvelopeCorrupted(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal engine error: {0}")]
    Internal(String),
}

impl ShareError {
    /// True for outcomes the caller may retry later without changing the
    /// request (operational pressure, not a denial or input error).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShareError::CapacityExhausted(_) | ShareError::StorageError(_)
        )
    }
}
