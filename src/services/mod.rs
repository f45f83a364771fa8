pub mod auth_service;
pub mod doctor_service;
pub mod mapping_service;
pub mod patient_service;

pub use auth_service::AuthService;
pub use doctor_service::DoctorService;
pub use mapping_service::MappingService;
pub use patient_service::PatientService;

use thiserror::Error;

/// Errors produced by the record services.
///
/// `NotFound` covers both a genuinely missing record and one the caller does
/// not own; the two are reported identically so callers cannot probe for the
/// existence of other users' records.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    NotFound { error: &'static str, message: &'static str },

    #[error("{message}")]
    Conflict { error: &'static str, message: &'static str },

    #[error("{message}")]
    Unauthorized { error: &'static str, message: &'static str },

    #[error(transparent)]
    Token(#[from] crate::auth::JwtError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Translate an engine-level unique-constraint violation at a write site into
/// a `Conflict`. Pre-checks give friendlier early errors, but under
/// concurrent writers the constraint is the authority and this is the path
/// that reports it.
pub(crate) fn conflict_on_unique(
    err: sqlx::Error,
    error: &'static str,
    message: &'static str,
) -> ServiceError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServiceError::Conflict { error, message }
        }
        _ => ServiceError::Database(err),
    }
}
