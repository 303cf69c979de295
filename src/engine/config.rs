// src/engine/config.rs
use crate::error::ShareError;
use std::env;
use std::time::Duration;

/// Environment variable supplying the per-deployment master secret used to
/// seal inline text. How the value is provisioned is out of scope.
pub const MASTER_SECRET_ENV: &str = "SHAREGATE_MASTER_SECRET";

pub const DEFAULT_SHORT_ID_LENGTH: usize = 7;
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 5;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_BLOB_RELEASE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Absent is tolerated at startup; only textual seal/open operations
    /// fail, and they fail with `ConfigurationMissing`, not a crypto error.
    pub master_secret: Option<String>,
    pub short_id_length: usize,
    pub max_id_attempts: u32,
    pub sweep_interval: Duration,
    pub blob_release_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            master_secret: None,
            short_id_length: DEFAULT_SHORT_ID_LENGTH,
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            blob_release_timeout: DEFAULT_BLOB_RELEASE_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            master_secret: env::var(MASTER_SECRET_ENV)
                .ok()
                .filter(|secret| !secret.is_empty()),
            ..Self::default()
        }
    }

    pub fn with_master_secret(secret: impl Into<String>) -> Self {
        Self {
            master_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// The master secret, or a loud `ConfigurationMissing` distinct from
    /// any corrupted-envelope error.
    pub fn master_secret(&self) -> Result<&str, ShareError> {
        self.master_secret.as_deref().ok_or_else(|| {
            ShareError::ConfigurationMissing(format!("{MASTER_SECRET_ENV} is not set"))
        })
    }
}
