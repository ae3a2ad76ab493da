//! Staff password hashing and verification.
//!
//! # Security
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//! - Hashes are stored in PHC string format, so verification reads the
//!   parameters back from the stored hash
//!
//! Both operations are CPU bound. Async callers should run them on the
//! blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Errors that can occur while hashing or verifying passwords.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The hasher failed to produce a hash.
    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    /// The stored hash is not a valid PHC string.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password for storage using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::HashingFailure` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `Ok(false)` for a wrong password.
///
/// # Errors
///
/// Returns `PasswordError::MalformedHash` if the stored hash cannot be parsed
/// or names an unsupported algorithm.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}
