use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::NewPatient;
use crate::error::{ApiError, FieldViolation};
use crate::middleware::auth::AuthUser;
use crate::services::PatientService;
use crate::validation::{char_len_in, check_id, is_valid_date, is_valid_email, is_valid_phone, trimmed};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PatientPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

impl PatientPayload {
    fn validate(self) -> Result<NewPatient, ApiError> {
        let mut details = Vec::new();

        let name = trimmed(self.name);
        match &name {
            Some(n) if char_len_in(n, 2, 100) => {}
            _ => details.push(FieldViolation::new("name", "Name must be between 2 and 100 characters")),
        }

        let email = trimmed(self.email).map(|e| e.to_lowercase());
        if let Some(e) = &email {
            if !is_valid_email(e) {
                details.push(FieldViolation::new("email", "Please provide a valid email address"));
            }
        }

        let phone = trimmed(self.phone);
        if let Some(p) = &phone {
            if !is_valid_phone(p) {
                details.push(FieldViolation::new("phone", "Please provide a valid phone number"));
            }
        }

        let date_of_birth = trimmed(self.date_of_birth);
        if let Some(d) = &date_of_birth {
            if !is_valid_date(d) {
                details.push(FieldViolation::new(
                    "date_of_birth",
                    "Please provide a valid date in YYYY-MM-DD format",
                ));
            }
        }

        let gender = trimmed(self.gender);
        if let Some(g) = &gender {
            if !matches!(g.as_str(), "male" | "female" | "other") {
                details.push(FieldViolation::new("gender", "Gender must be male, female, or other"));
            }
        }

        let address = trimmed(self.address);
        if let Some(a) = &address {
            if a.chars().count() > 500 {
                details.push(FieldViolation::new("address", "Address must not exceed 500 characters"));
            }
        }

        let medical_history = trimmed(self.medical_history);
        if let Some(m) = &medical_history {
            if m.chars().count() > 2000 {
                details.push(FieldViolation::new(
                    "medical_history",
                    "Medical history must not exceed 2000 characters",
                ));
            }
        }

        if !details.is_empty() {
            return Err(ApiError::validation(details));
        }

        Ok(NewPatient {
            name: name.unwrap_or_default(),
            email,
            phone,
            date_of_birth,
            gender,
            address,
            medical_history,
        })
    }
}

/// POST /api/patients
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_patient = payload.validate()?;
    let patient = PatientService::new(state.db.clone()).create(user.id, &new_patient).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient created successfully",
            "patient": patient,
        })),
    ))
}

/// GET /api/patients
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let patients = PatientService::new(state.db.clone()).list(user.id).await?;

    Ok(Json(json!({
        "message": "Patients retrieved successfully",
        "count": patients.len(),
        "patients": patients,
    })))
}

/// GET /api/patients/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    let patient = PatientService::new(state.db.clone()).get(user.id, id).await?;

    Ok(Json(json!({
        "message": "Patient retrieved successfully",
        "patient": patient,
    })))
}

/// PUT /api/patients/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    let new_patient = payload.validate()?;
    let patient = PatientService::new(state.db.clone()).update(user.id, id, &new_patient).await?;

    Ok(Json(json!({
        "message": "Patient updated successfully",
        "patient": patient,
    })))
}

/// DELETE /api/patients/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    PatientService::new(state.db.clone()).delete(user.id, id).await?;

    Ok(Json(json!({
        "message": "Patient deleted successfully",
    })))
}
