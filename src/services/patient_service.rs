use crate::database::models::{NewPatient, Patient};
use crate::database::Database;

use super::ServiceError;

/// Patient records follow a strict single-owner model: every lookup and
/// mutation is scoped to `created_by`, so a record another user owns is
/// indistinguishable from one that does not exist.
pub struct PatientService {
    db: Database,
}

impl PatientService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn not_found(message: &'static str) -> ServiceError {
        ServiceError::NotFound { error: "Patient not found", message }
    }

    pub async fn create(&self, owner: i64, new: &NewPatient) -> Result<Patient, ServiceError> {
        let result = sqlx::query(
            "INSERT INTO patients (name, email, phone, date_of_birth, gender, address, medical_history, created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.address)
        .bind(&new.medical_history)
        .bind(owner)
        .execute(self.db.pool())
        .await?;

        // Re-read so the response carries the generated id and timestamps
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(self.db.pool())
            .await?;

        tracing::info!(patient_id = patient.id, owner, "created patient");
        Ok(patient)
    }

    /// All patients owned by the caller, in insertion order
    pub async fn list(&self, owner: i64) -> Result<Vec<Patient>, ServiceError> {
        let patients =
            sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE created_by = ? ORDER BY id")
                .bind(owner)
                .fetch_all(self.db.pool())
                .await?;
        Ok(patients)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<Patient, ServiceError> {
        self.find_owned(owner, id)
            .await?
            .ok_or_else(|| Self::not_found("Patient does not exist or you do not have permission to view it"))
    }

    /// Full-replacement update; ownership is re-checked and all fields are
    /// overwritten with the validated input.
    pub async fn update(&self, owner: i64, id: i64, new: &NewPatient) -> Result<Patient, ServiceError> {
        if self.find_owned(owner, id).await?.is_none() {
            return Err(Self::not_found(
                "Patient does not exist or you do not have permission to update it",
            ));
        }

        sqlx::query(
            "UPDATE patients SET
             name = ?, email = ?, phone = ?, date_of_birth = ?,
             gender = ?, address = ?, medical_history = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND created_by = ?",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.address)
        .bind(&new.medical_history)
        .bind(id)
        .bind(owner)
        .execute(self.db.pool())
        .await?;

        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(patient)
    }

    /// Deletion cascades to all mappings referencing this patient (engine
    /// enforced).
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), ServiceError> {
        if self.find_owned(owner, id).await?.is_none() {
            return Err(Self::not_found(
                "Patient does not exist or you do not have permission to delete it",
            ));
        }

        sqlx::query("DELETE FROM patients WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner)
            .execute(self.db.pool())
            .await?;

        tracing::info!(patient_id = id, owner, "deleted patient");
        Ok(())
    }

    /// The ownership predicate: a row comes back only when it exists AND is
    /// owned by the caller.
    pub(crate) async fn find_owned(&self, owner: i64, id: i64) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner)
            .fetch_optional(self.db.pool())
            .await
    }
}
