use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::NewUser;
use crate::error::{ApiError, FieldViolation};
use crate::services::AuthService;
use crate::validation::{char_len_in, is_valid_email, trimmed};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterPayload {
    fn validate(self) -> Result<NewUser, ApiError> {
        let mut details = Vec::new();

        let name = trimmed(self.name);
        match &name {
            Some(n) if char_len_in(n, 2, 100) => {}
            _ => details.push(FieldViolation::new("name", "Name must be between 2 and 100 characters")),
        }

        let email = trimmed(self.email).map(|e| e.to_lowercase());
        match &email {
            Some(e) if is_valid_email(e) => {}
            _ => details.push(FieldViolation::new("email", "Please provide a valid email address")),
        }

        let password = self.password.unwrap_or_default();
        if password.chars().count() < 6 {
            details.push(FieldViolation::new("password", "Password must be at least 6 characters"));
        }

        if !details.is_empty() {
            return Err(ApiError::validation(details));
        }

        Ok(NewUser {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_user = payload.validate()?;
    let (user, token) = AuthService::new(state.db.clone()).register(&new_user).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
            "token": token,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut details = Vec::new();
    let email = trimmed(payload.email).map(|e| e.to_lowercase());
    if email.is_none() {
        details.push(FieldViolation::new("email", "Email is required"));
    }
    let password = payload.password.unwrap_or_default();
    if password.is_empty() {
        details.push(FieldViolation::new("password", "Password is required"));
    }
    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let (user, token) = AuthService::new(state.db.clone())
        .login(&email.unwrap_or_default(), &password)
        .await?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
        "token": token,
    })))
}
