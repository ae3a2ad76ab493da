//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Token signing and lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 signing secret.
    pub jwt_secret: String,

    /// How long an issued token stays valid.
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Errors found while validating [`AuthConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the signing secret is empty and
    /// `ConfigError::InvalidValue` if the token lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("auth.jwt_secret".to_string()));
        }

        if self.token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime must be > 0".to_string(),
            ));
        }

        if self.jwt_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = self.jwt_secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "auth.jwt_secret is shorter than recommended"
            );
        }

        Ok(())
    }
}
