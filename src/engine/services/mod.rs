// src/engine/services/mod.rs
pub mod allocator;
pub mod item_service;
pub mod scheduler;
