use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i64,
    pub created_by: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated doctor input, used for both create and full-replacement update
#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i64,
}
