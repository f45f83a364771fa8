use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// Mapping row joined with the names of the patient and doctor it links
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MappingDetail {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub assigned_date: NaiveDateTime,
    pub notes: Option<String>,
    pub created_by: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub specialization: String,
}

/// Doctor row annotated with the owning mapping, as returned by the
/// doctors-for-patient read path
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignedDoctor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i64,
    pub assigned_date: NaiveDateTime,
    pub notes: Option<String>,
    pub mapping_id: i64,
}

/// Validated mapping input
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub notes: Option<String>,
}
