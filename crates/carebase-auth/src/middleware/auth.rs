//! Bearer token authentication.
//!
//! The gate walks a request through these steps, aborting with 401 at the
//! first failure:
//!
//! 1. `Authorization` holds exactly `Bearer <token>` (scheme case-insensitive)
//! 2. the token verifies (signature, algorithm, expiry)
//! 3. the payload resolves to an identity
//! 4. the staff member still exists and belongs to the claimed hospital
//!
//! Every cause yields the same response body; the real cause is logged at
//! debug level.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AuthError;
use crate::storage::{HospitalStorage, StaffStorage};
use crate::token::{TokenCodec, claims};

use super::types::StaffContext;

/// Message returned for every authentication failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid or missing credentials";

// =============================================================================
// Auth State
// =============================================================================

/// State required by the auth gate and the hospital scope guard.
///
/// Include it in the application state and expose it via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Codec used to verify bearer tokens.
    pub codec: Arc<TokenCodec>,
    /// Staff directory, re-read on every request.
    pub staff: Arc<dyn StaffStorage>,
    /// Hospital directory, used to resolve path references.
    pub hospitals: Arc<dyn HospitalStorage>,
}

impl AuthState {
    pub fn new(
        codec: Arc<TokenCodec>,
        staff: Arc<dyn StaffStorage>,
        hospitals: Arc<dyn HospitalStorage>,
    ) -> Self {
        Self {
            codec,
            staff,
            hospitals,
        }
    }
}

// =============================================================================
// Gate
// =============================================================================

fn rejected(reason: &str) -> AuthError {
    tracing::debug!(reason, "Authentication failed");
    AuthError::unauthorized(UNAUTHENTICATED_MESSAGE)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| rejected("missing Authorization header"))?
        .to_str()
        .map_err(|_| rejected("non-ASCII Authorization header"))?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(rejected("malformed Authorization header")),
    }
}

/// Runs the full gate against a request's headers.
///
/// # Errors
///
/// Returns `AuthError::Unauthorized` for every credential problem, or
/// `AuthError::Storage` if the staff lookup itself fails.
pub async fn authenticate(state: &AuthState, headers: &HeaderMap) -> Result<StaffContext, AuthError> {
    let token = bearer_token(headers)?.to_string();

    let payload = state
        .codec
        .clone()
        .verify_async(token)
        .await
        .map_err(|e| rejected(&e.to_string()))?;

    let identity = claims::resolve(&payload).ok_or_else(|| rejected("no identity in token"))?;

    let staff = state
        .staff
        .find_by_id(identity.staff_id)
        .await?
        .ok_or_else(|| rejected("staff no longer exists"))?;

    if staff.hospital_id != identity.hospital_id {
        tracing::warn!(
            staff_id = staff.id,
            staff_hospital = staff.hospital_id,
            token_hospital = identity.hospital_id,
            "Token hospital does not match staff record"
        );
        return Err(AuthError::unauthorized(UNAUTHENTICATED_MESSAGE));
    }

    let context = StaffContext::from(&staff);
    tracing::debug!(
        staff_id = context.staff_id,
        hospital_id = context.hospital_id,
        "Token validated successfully"
    );

    Ok(context)
}

/// Middleware that rejects unauthenticated requests and attaches
/// [`StaffContext`] to the request extensions.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/patient/search", get(search))
///     .route_layer(axum::middleware::from_fn_with_state(auth_state, require_staff));
/// ```
pub async fn require_staff(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor for the authenticated staff member.
///
/// Reuses the context attached by [`require_staff`] when present; otherwise
/// runs the gate itself.
///
/// ```ignore
/// async fn handler(BearerAuth(staff): BearerAuth) -> impl IntoResponse {
///     format!("hospital {}", staff.hospital_id)
/// }
/// ```
pub struct BearerAuth(pub StaffContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<StaffContext>() {
            return Ok(BearerAuth(context.clone()));
        }

        let auth_state = AuthState::from_ref(state);
        let context = authenticate(&auth_state, &parts.headers).await?;
        parts.extensions.insert(context.clone());

        Ok(BearerAuth(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode, header::WWW_AUTHENTICATE},
        routing::get,
    };
    use serde_json::json;
    use time::OffsetDateTime;
    use tower::ServiceExt;

    use crate::service::AuthService;
    use crate::service::tests::{MockDirectory, codec};

    async fn setup() -> (AuthState, Arc<MockDirectory>, String) {
        let directory = MockDirectory::with_hospitals(&["Central", "Green Valley"]);
        let codec = codec();
        let service = AuthService::new(directory.clone(), directory.clone(), codec.clone());
        service.register("Central", "nurse1", "pw").await.unwrap();
        let token = service.login("Central", "nurse1", "pw").await.unwrap().token;

        let state = AuthState::new(codec, directory.clone(), directory.clone());
        (state, directory, token)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn expect_unauthorized(result: Result<StaffContext, AuthError>) {
        match result {
            Err(AuthError::Unauthorized { message }) => {
                assert_eq!(message, UNAUTHENTICATED_MESSAGE)
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let (state, _, token) = setup().await;

        let context = authenticate(&state, &headers(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(context.hospital_id, 1);
        assert_eq!(context.username, "nurse1");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let (state, _, token) = setup().await;

        assert!(authenticate(&state, &headers(&format!("bearer {token}"))).await.is_ok());
        assert!(authenticate(&state, &headers(&format!("BEARER  {token}"))).await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_headers() {
        let (state, _, token) = setup().await;

        expect_unauthorized(authenticate(&state, &HeaderMap::new()).await);
        expect_unauthorized(authenticate(&state, &headers(&token)).await);
        expect_unauthorized(authenticate(&state, &headers(&format!("Basic {token}"))).await);
        expect_unauthorized(authenticate(&state, &headers(&format!("Bearer {token} extra"))).await);
        expect_unauthorized(authenticate(&state, &headers("Bearer")).await);
        expect_unauthorized(authenticate(&state, &headers("Bearer not.a.jwt")).await);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (state, _, _) = setup().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = state
            .codec
            .encode(&json!({"staff_id": 1, "hospital_id": 1, "iat": now - 60, "exp": now - 1}))
            .unwrap();

        expect_unauthorized(authenticate(&state, &headers(&format!("Bearer {token}"))).await);
    }

    #[tokio::test]
    async fn test_loose_claims_accepted() {
        let (state, _, _) = setup().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = state
            .codec
            .encode(&json!({"staffId": "1", "hospitalId": 1.0, "exp": now + 60}))
            .unwrap();

        let context = authenticate(&state, &headers(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(context.staff_id, 1);
    }

    #[tokio::test]
    async fn test_deleted_staff_rejected() {
        let (state, directory, token) = setup().await;
        directory.remove_staff(1);

        expect_unauthorized(authenticate(&state, &headers(&format!("Bearer {token}"))).await);
    }

    #[tokio::test]
    async fn test_hospital_mismatch_rejected() {
        let (state, _, _) = setup().await;
        let token = state.codec.issue(1, 2).unwrap();

        expect_unauthorized(authenticate(&state, &headers(&format!("Bearer {token}"))).await);
    }

    #[tokio::test]
    async fn test_foreign_secret_rejected() {
        let (state, _, _) = setup().await;
        let foreign = TokenCodec::new(b"someone-else", Duration::from_secs(60)).unwrap();
        let token = foreign.issue(1, 1).unwrap();

        expect_unauthorized(authenticate(&state, &headers(&format!("Bearer {token}"))).await);
    }

    #[tokio::test]
    async fn test_require_staff_middleware() {
        let (state, _, token) = setup().await;

        async fn whoami(BearerAuth(staff): BearerAuth) -> String {
            staff.username
        }

        let app = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                require_staff,
            ))
            .with_state(state);

        let response = app
            .clone()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }
}
