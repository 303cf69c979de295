// src/engine/models/mod.rs
pub mod common;
pub mod item;

// Re-export common types/enums for easier access
pub use common::*;
pub use item::{ContentRef, Item};
