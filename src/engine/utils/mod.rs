// src/engine/utils/mod.rs
pub mod crypto;
pub mod guards;
pub mod rng;
pub mod time;
