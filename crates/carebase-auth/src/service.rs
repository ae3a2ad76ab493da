//! Staff registration and login.

use std::sync::Arc;

use carebase_core::{Hospital, NewStaff, Staff};

use crate::AuthResult;
use crate::error::AuthError;
use crate::password::{self, PasswordError};
use crate::storage::{HospitalStorage, StaffStorage};
use crate::token::TokenCodec;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated staff member.
    pub staff: Staff,
}

/// Registers staff members and exchanges credentials for tokens.
#[derive(Clone)]
pub struct AuthService {
    hospitals: Arc<dyn HospitalStorage>,
    staff: Arc<dyn StaffStorage>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        hospitals: Arc<dyn HospitalStorage>,
        staff: Arc<dyn StaffStorage>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            hospitals,
            staff,
            codec,
        }
    }

    /// Creates a staff account in the referenced hospital.
    ///
    /// # Errors
    ///
    /// - `HospitalNotFound` if the reference resolves to no hospital
    /// - `UsernameTaken` if the username exists in that hospital
    /// - `HashingFailure` or `Storage` on internal failures
    pub async fn register(
        &self,
        hospital_ref: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<Staff> {
        let hospital = self.resolve_hospital(hospital_ref).await?;

        if self
            .staff
            .find_by_username(hospital.id, username)
            .await?
            .is_some()
        {
            return Err(AuthError::username_taken(username));
        }

        let password = password.to_string();
        let password_hash = run_blocking(move || password::hash_password(&password)).await?;

        let staff = self
            .staff
            .create(NewStaff {
                username: username.to_string(),
                password_hash,
                hospital_id: hospital.id,
            })
            .await
            .map_err(|e| {
                if e.is_already_exists() {
                    AuthError::username_taken(username)
                } else {
                    AuthError::from(e)
                }
            })?;

        tracing::info!(
            staff_id = staff.id,
            hospital_id = staff.hospital_id,
            username = %staff.username,
            "Staff registered"
        );

        Ok(staff)
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// An unknown username and a wrong password both yield
    /// `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// - `HospitalNotFound` if the reference resolves to no hospital
    /// - `InvalidCredentials` on a bad username/password pair
    /// - `HashingFailure`, `Token` or `Storage` on internal failures
    pub async fn login(
        &self,
        hospital_ref: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<LoginOutcome> {
        let hospital = self.resolve_hospital(hospital_ref).await?;

        let Some(staff) = self.staff.find_by_username(hospital.id, username).await? else {
            tracing::debug!(hospital_id = hospital.id, "Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let hash = staff.password_hash.clone();
        let matches = run_blocking(move || password::verify_password(&password, &hash)).await?;

        if !matches {
            tracing::debug!(staff_id = staff.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue(staff.id, staff.hospital_id)?;

        tracing::info!(
            staff_id = staff.id,
            hospital_id = staff.hospital_id,
            "Staff logged in"
        );

        Ok(LoginOutcome { token, staff })
    }

    async fn resolve_hospital(&self, reference: &str) -> AuthResult<Hospital> {
        self.hospitals
            .resolve(reference)
            .await?
            .ok_or_else(|| AuthError::hospital_not_found(reference))
    }
}

async fn run_blocking<T, F>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
        .map_err(AuthError::from)
}
