// src/engine/lib.rs
//! Item lifecycle and access-control engine for gated content sharing.
//!
//! A producer publishes content (a file reference, a redirect target or
//! inline text) behind a short, unguessable identifier, optionally gated by
//! a password, a quiz answer, a release time, a view quota and/or an
//! expiration timestamp. A consumer resolves the identifier and, once every
//! configured gate is satisfied, retrieves the content with the access
//! counted atomically. A background sweep retires items whose lifecycle has
//! ended. Transport, upload plumbing and scan-code rendering live outside
//! this crate, behind the collaborator traits in [`storage`].

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::EngineConfig;
pub use error::ShareError;
