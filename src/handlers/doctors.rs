use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::NewDoctor;
use crate::error::{ApiError, FieldViolation};
use crate::middleware::auth::AuthUser;
use crate::services::DoctorService;
use crate::validation::{char_len_in, check_id, is_valid_email, is_valid_phone, trimmed};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DoctorPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub years_of_experience: Option<i64>,
}

impl DoctorPayload {
    fn validate(self) -> Result<NewDoctor, ApiError> {
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

        let specialization = trimmed(self.specialization);
        match &specialization {
            Some(s) if char_len_in(s, 2, 100) => {}
            _ => details.push(FieldViolation::new(
                "specialization",
                "Specialization must be between 2 and 100 characters",
            )),
        }

        let license_number = trimmed(self.license_number);
        match &license_number {
            Some(l) if char_len_in(l, 5, 50) => {}
            _ => details.push(FieldViolation::new(
                "license_number",
                "License number must be between 5 and 50 characters",
            )),
        }

        let years_of_experience = self.years_of_experience.unwrap_or(0);
        if !(0..=70).contains(&years_of_experience) {
            details.push(FieldViolation::new(
                "years_of_experience",
                "Years of experience must be between 0 and 70",
            ));
        }

        if !details.is_empty() {
            return Err(ApiError::validation(details));
        }

        Ok(NewDoctor {
            name: name.unwrap_or_default(),
            email,
            phone,
            specialization: specialization.unwrap_or_default(),
            license_number: license_number.unwrap_or_default(),
            years_of_experience,
        })
    }
}

/// POST /api/doctors
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DoctorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_doctor = payload.validate()?;
    let doctor = DoctorService::new(state.db.clone()).create(user.id, &new_doctor).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor created successfully",
            "doctor": doctor,
        })),
    ))
}

/// GET /api/doctors - directory visibility, not scoped to the caller
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doctors = DoctorService::new(state.db.clone()).list().await?;

    Ok(Json(json!({
        "message": "Doctors retrieved successfully",
        "count": doctors.len(),
        "doctors": doctors,
    })))
}

/// GET /api/doctors/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    let doctor = DoctorService::new(state.db.clone()).get(id).await?;

    Ok(Json(json!({
        "message": "Doctor retrieved successfully",
        "doctor": doctor,
    })))
}

/// PUT /api/doctors/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DoctorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    let new_doctor = payload.validate()?;
    let doctor = DoctorService::new(state.db.clone()).update(id, &new_doctor).await?;

    Ok(Json(json!({
        "message": "Doctor updated successfully",
        "doctor": doctor,
    })))
}

/// DELETE /api/doctors/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    check_id("id", id)?;
    DoctorService::new(state.db.clone()).delete(id).await?;

    Ok(Json(json!({
        "message": "Doctor deleted successfully",
    })))
}
