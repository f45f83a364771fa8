use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::NewMapping;
use crate::error::{ApiError, FieldViolation};
use crate::middleware::auth::AuthUser;
use crate::services::MappingService;
use crate::validation::{check_id, trimmed};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MappingPayload {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub notes: Option<String>,
}

impl MappingPayload {
    fn validate(self) -> Result<NewMapping, ApiError> {
        let mut details = Vec::new();

        let patient_id = self.patient_id.unwrap_or(0);
        if patient_id < 1 {
            details.push(FieldViolation::new("patient_id", "Valid patient ID is required"));
        }

        let doctor_id = self.doctor_id.unwrap_or(0);
        if doctor_id < 1 {
            details.push(FieldViolation::new("doctor_id", "Valid doctor ID is required"));
        }

        let notes = trimmed(self.notes);
        if let Some(n) = &notes {
            if n.chars().count() > 1000 {
                details.push(FieldViolation::new("notes", "Notes must not exceed 1000 characters"));
            }
        }

        if !details.is_empty() {
            return Err(ApiError::validation(details));
        }

        Ok(NewMapping { patient_id, doctor_id, notes })
    }
}

/// POST /api/mappings
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MappingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_mapping = payload.validate()?;
    let mapping = MappingService::new(state.db.clone()).create(user.id, &new_mapping).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor assigned to patient successfully",
            "mapping": mapping,
        })),
    ))
}

/// GET /api/mappings
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let mappings = MappingService::new(state.db.clone()).list(user.id).await?;

    Ok(Json(json!({
        "message": "Mappings retrieved successfully",
        "count": mappings.len(),
        "mappings": mappings,
    })))
}

/// GET /api/mappings/:patient_id - all doctors assigned to one of the
/// caller's patients
pub async fn doctors_for_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("patient_id", patient_id)?;
    let (patient, doctors) =
        MappingService::new(state.db.clone()).doctors_for_patient(user.id, patient_id).await?;

    Ok(Json(json!({
        "message": "Patient doctors retrieved successfully",
        "patient": {
            "id": patient.id,
            "name": patient.name,
        },
        "count": doctors.len(),
        "doctors": doctors,
    })))
}

/// DELETE /api/mappings/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    MappingService::new(state.db.clone()).delete(user.id, id).await?;

    Ok(Json(json!({
        "message": "Doctor unassigned from patient successfully",
    })))
}
