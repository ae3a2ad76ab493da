use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use carebase_auth::{AuthError, BearerAuth, HospitalScope};
use carebase_core::{Hospital, HospitalId, NewHospital, Patient, StaffId};
use carebase_search::{PatientLookup, PatientSearch};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "CareBase",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// =============================================================================
// Hospitals
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateHospitalRequest {
    #[serde(default)]
    pub name: String,
}

pub async fn create_hospital(
    State(state): State<AppState>,
    payload: Result<Json<CreateHospitalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let hospital = state.hospitals.create(NewHospital::new(body.name)).await?;
    tracing::info!(hospital_id = hospital.id, name = %hospital.name, "Hospital created");

    Ok((StatusCode::CREATED, Json(hospital)))
}

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StaffCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl StaffCredentials {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::bad_request("username is required"));
        }
        if self.password.is_empty() {
            return Err(ApiError::bad_request("password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StaffCreated {
    pub staff_id: StaffId,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub staff_id: StaffId,
    pub username: String,
    pub hospital_id: HospitalId,
}

pub async fn create_staff(
    State(state): State<AppState>,
    Path(hospital): Path<String>,
    payload: Result<Json<StaffCredentials>, JsonRejection>,
) -> Result<(StatusCode, Json<StaffCreated>), ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    body.validate()?;

    let staff = state
        .service
        .register(&hospital, &body.username, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StaffCreated {
            staff_id: staff.id,
            username: staff.username,
        }),
    ))
}

pub async fn login_staff(
    State(state): State<AppState>,
    Path(hospital): Path<String>,
    payload: Result<Json<StaffCredentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    body.validate()?;

    let outcome = state
        .service
        .login(&hospital, &body.username, &body.password)
        .await
        .map_err(|e| match e {
            // An unknown hospital is reported like any other bad credential
            AuthError::HospitalNotFound { .. } => AuthError::InvalidCredentials,
            other => other,
        })?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        staff_id: outcome.staff.id,
        username: outcome.staff.username,
        hospital_id: outcome.staff.hospital_id,
    }))
}

// =============================================================================
// Patients
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PatientList {
    pub patients: Vec<Patient>,
}

/// `GET /patient/search`: searches the caller's own hospital.
pub async fn search_patients(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PatientList>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let search = PatientSearch::from_params(staff.hospital_id, params)?;

    let patients = state.patients.search(&search).await?;
    tracing::debug!(
        staff_id = staff.staff_id,
        hospital_id = staff.hospital_id,
        results = patients.len(),
        "Patient search"
    );

    Ok(Json(PatientList { patients }))
}

/// `GET /{hospital}/patient/search/{id}`: one patient by national id or
/// passport id.
pub async fn get_patient(
    State(state): State<AppState>,
    scope: HospitalScope,
    Path((_hospital, id)): Path<(String, String)>,
) -> Result<Json<Patient>, ApiError> {
    let lookup = PatientLookup::new(scope.hospital_id, id);

    let patient = state
        .patients
        .lookup(&lookup)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient not found"))?;

    Ok(Json(patient))
}
