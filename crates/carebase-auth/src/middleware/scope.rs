//! Hospital scoping for path-addressed routes.
//!
//! Routes shaped like `/{hospital}/...` name a hospital by id or by name. The
//! guard resolves that segment and requires it to be the caller's own
//! hospital. A foreign hospital yields 403, an unknown one 404.

use std::collections::HashMap;

use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};

use carebase_core::HospitalId;

use crate::error::AuthError;

use super::auth::{AuthState, BearerAuth};
use super::types::StaffContext;

/// Name of the path parameter holding the hospital reference.
pub const HOSPITAL_PATH_PARAM: &str = "hospital";

/// The caller's hospital, confirmed against the `{hospital}` path segment.
#[derive(Debug, Clone)]
pub struct HospitalScope {
    /// Canonical id of the scoped hospital.
    pub hospital_id: HospitalId,
    /// The authenticated staff member.
    pub staff: StaffContext,
}

impl<S> FromRequestParts<S> for HospitalScope
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(staff) = BearerAuth::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AuthError::invalid_request(e.body_text()))?;

        let reference = params
            .get(HOSPITAL_PATH_PARAM)
            .ok_or_else(|| AuthError::internal("route has no {hospital} segment"))?;

        let auth_state = AuthState::from_ref(state);
        let hospital = auth_state
            .hospitals
            .resolve(reference)
            .await?
            .ok_or_else(|| AuthError::hospital_not_found(reference.as_str()))?;

        if hospital.id != staff.hospital_id {
            tracing::warn!(
                staff_id = staff.staff_id,
                staff_hospital = staff.hospital_id,
                requested_hospital = hospital.id,
                "Cross-hospital access denied"
            );
            return Err(AuthError::forbidden(
                "Access to this hospital's records is not allowed",
            ));
        }

        Ok(HospitalScope {
            hospital_id: hospital.id,
            staff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
        routing::get,
    };
    use tower::ServiceExt;

    use crate::service::AuthService;
    use crate::service::tests::{MockDirectory, codec};

    async fn app() -> (Router, String, String) {
        let directory = MockDirectory::with_hospitals(&["Central", "Green Valley"]);
        let codec = codec();
        let service = AuthService::new(directory.clone(), directory.clone(), codec.clone());
        service.register("Central", "nurse1", "pw").await.unwrap();
        service.register("Green Valley", "nurse2", "pw").await.unwrap();
        let central = service.login("Central", "nurse1", "pw").await.unwrap().token;
        let green = service.login("Green Valley", "nurse2", "pw").await.unwrap().token;

        async fn scoped(scope: HospitalScope) -> String {
            scope.hospital_id.to_string()
        }

        let state = AuthState::new(codec, directory.clone(), directory);
        let router = Router::new()
            .route("/{hospital}/records/{id}", get(scoped))
            .with_state(state);
        (router, central, green)
    }

    async fn call(app: &Router, uri: &str, token: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(
                Request::get(uri)
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_own_hospital_by_id_and_name() {
        let (app, central, _) = app().await;

        assert_eq!(call(&app, "/1/records/x", &central).await, (StatusCode::OK, "1".into()));
        assert_eq!(
            call(&app, "/Central/records/x", &central).await,
            (StatusCode::OK, "1".into())
        );
    }

    #[tokio::test]
    async fn test_foreign_hospital_forbidden() {
        let (app, central, green) = app().await;

        assert_eq!(call(&app, "/2/records/x", &central).await.0, StatusCode::FORBIDDEN);
        assert_eq!(call(&app, "/Central/records/x", &green).await.0, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_hospital_not_found() {
        let (app, central, _) = app().await;

        assert_eq!(call(&app, "/99/records/x", &central).await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(&app, "/Nowhere/records/x", &central).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unauthenticated_before_scope() {
        let (app, _, _) = app().await;

        assert_eq!(call(&app, "/1/records/x", "garbage").await.0, StatusCode::UNAUTHORIZED);
    }
}
