pub mod auth;
pub mod doctors;
pub mod mappings;
pub mod patients;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Healthcare Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "documentation": "/api",
        "health": "/health",
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "message": "Healthcare Backend API is running",
                "timestamp": now,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "DEGRADED",
                "message": "Database unavailable",
                "timestamp": now,
                "error": e.to_string(),
            })),
        ),
    }
}

/// Static capability listing for the whole API surface
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Healthcare Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "authentication": {
                "POST /api/auth/register": "Register a new user",
                "POST /api/auth/login": "Login user and get JWT token",
            },
            "patients": {
                "POST /api/patients": "Create a new patient (Auth required)",
                "GET /api/patients": "Get all patients for authenticated user",
                "GET /api/patients/:id": "Get specific patient details",
                "PUT /api/patients/:id": "Update patient details",
                "DELETE /api/patients/:id": "Delete patient record",
            },
            "doctors": {
                "POST /api/doctors": "Create a new doctor (Auth required)",
                "GET /api/doctors": "Get all doctors",
                "GET /api/doctors/:id": "Get specific doctor details",
                "PUT /api/doctors/:id": "Update doctor details",
                "DELETE /api/doctors/:id": "Delete doctor record",
            },
            "mappings": {
                "POST /api/mappings": "Assign doctor to patient (Auth required)",
                "GET /api/mappings": "Get all patient-doctor mappings",
                "GET /api/mappings/:patient_id": "Get all doctors for specific patient",
                "DELETE /api/mappings/:id": "Remove doctor from patient",
            },
        },
        "authentication": "Include \"Authorization: Bearer <token>\" header for protected endpoints",
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "message": "The requested resource does not exist",
        })),
    )
}
