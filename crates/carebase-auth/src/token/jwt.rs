//! HS256 JWT issuance and validation.
//!
//! Tokens are compact JWS strings signed with a shared secret. The payload
//! carries `staff_id`, `hospital_id`, `iat` and `exp`. Verification accepts
//! only HS256, requires `exp` and applies zero leeway, so a token is valid
//! strictly before its expiry second.
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use carebase_auth::token::jwt::TokenCodec;
//!
//! let codec = TokenCodec::new(b"secret", Duration::from_secs(3600))?;
//! let token = codec.issue(7, 1)?;
//! let payload = codec.verify(&token)?;
//! assert_eq!(payload["staff_id"], 7);
//! ```

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use carebase_core::{HospitalId, StaffId};

use crate::config::AuthConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The token is malformed, uses another algorithm, or cannot be parsed.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Invalid key data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::decoding_error(err.to_string()),
            ErrorKind::MissingRequiredClaim(_) | ErrorKind::ImmatureSignature => {
                Self::invalid_claims(err.to_string())
            }
            ErrorKind::InvalidKeyFormat => Self::invalid_key(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claim set written by [`TokenCodec::issue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffClaims {
    pub staff_id: StaffId,
    pub hospital_id: HospitalId,
    pub iat: i64,
    pub exp: i64,
}

// ============================================================================
// Codec
// ============================================================================

/// Signs and verifies session tokens with one shared HS256 secret.
///
/// Built once at startup and shared read-only behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from a raw secret and token lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` for an empty secret.
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::invalid_key("signing secret is empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        })
    }

    /// Creates a codec from the auth configuration.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the configured secret is empty.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::new(config.jwt_secret.as_bytes(), config.token_lifetime)
    }

    /// Lifetime applied to issued tokens.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Builds the claim set for a staff member, valid from now.
    #[must_use]
    pub fn claims_for(&self, staff_id: StaffId, hospital_id: HospitalId) -> StaffClaims {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);

        StaffClaims {
            staff_id,
            hospital_id,
            iat,
            exp: iat.saturating_add(lifetime),
        }
    }

    /// Issues a signed token for a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, staff_id: StaffId, hospital_id: HospitalId) -> Result<String, TokenError> {
        self.encode(&self.claims_for(staff_id, hospital_id))
    }

    /// Signs an arbitrary claim set with the codec's key.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::encoding_error(e.to_string()))
    }

    /// Verifies a token and returns its raw payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature, algorithm or expiry check fails.
    pub fn verify(&self, token: &str) -> Result<Value, TokenError> {
        let data = decode::<Value>(token, &self.decoding_key, &self.validation)?;

        // The library accepts exp == now; the session ends at exp.
        let now = OffsetDateTime::now_utc().unix_timestamp();
        match data.claims.get("exp").and_then(Value::as_f64) {
            Some(exp) if exp > now as f64 => Ok(data.claims),
            Some(_) => Err(TokenError::Expired),
            None => Err(TokenError::invalid_claims("exp must be a number")),
        }
    }

    /// Verifies a token on the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`TokenCodec::verify`]; a panicked worker is reported as a
    /// decoding error.
    pub async fn verify_async(self: Arc<Self>, token: String) -> Result<Value, TokenError> {
        tokio::task::spawn_blocking(move || self.verify(&token))
            .await
            .map_err(|e| TokenError::decoding_error(e.to_string()))?
    }
}
