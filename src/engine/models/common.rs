// src/engine/models/common.rs
use serde::{Deserialize, Serialize};

pub type Timestamp = u64; // Epoch seconds
pub type InternalId = u64; // Internal counter/ID for storage

/// The two public-identifier uniqueness domains. A short id fronts the
/// shareable link; a secondary id backs the companion scan artifact and is
/// unique independently of the short-id space.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum IdDomain {
    Short,
    Secondary,
}

/// Content-kind discriminator for inline payloads. An explicit enum rather
/// than a string prefix baked into the payload field.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    DocExtract,
    SlideExtract,
}
