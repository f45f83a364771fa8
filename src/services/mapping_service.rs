use crate::database::models::{AssignedDoctor, MappingDetail, NewMapping, Patient};
use crate::database::Database;
use crate::services::PatientService;

use super::{conflict_on_unique, ServiceError};

const DUPLICATE_PAIR: (&str, &str) =
    ("Mapping already exists", "This doctor is already assigned to this patient");

const DETAIL_QUERY: &str = "SELECT pdm.id, pdm.patient_id, pdm.doctor_id, pdm.assigned_date, pdm.notes, pdm.created_by,
            p.name AS patient_name, d.name AS doctor_name, d.specialization
     FROM patient_doctor_mappings pdm
     JOIN patients p ON pdm.patient_id = p.id
     JOIN doctors d ON pdm.doctor_id = d.id";

/// Patient-doctor assignments. A mapping can only be created against a
/// patient the caller owns, may reference any existing doctor, and is
/// readable/deletable only by its creator. The (patient, doctor) pair is
/// unique, with the engine's constraint as the authority under races.
pub struct MappingService {
    db: Database,
}

impl MappingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner: i64, new: &NewMapping) -> Result<MappingDetail, ServiceError> {
        // The referenced patient must exist AND belong to the caller; both
        // failures report the same way
        let patients = PatientService::new(self.db.clone());
        if patients.find_owned(owner, new.patient_id).await?.is_none() {
            return Err(ServiceError::NotFound {
                error: "Patient not found",
                message: "Patient does not exist or you do not have permission to assign doctors",
            });
        }

        // Any existing doctor qualifies, regardless of creator
        let doctor = sqlx::query_scalar::<_, i64>("SELECT id FROM doctors WHERE id = ?")
            .bind(new.doctor_id)
            .fetch_optional(self.db.pool())
            .await?;
        if doctor.is_none() {
            return Err(ServiceError::NotFound {
                error: "Doctor not found",
                message: "Doctor does not exist",
            });
        }

        // Pair uniqueness pre-check; UNIQUE(patient_id, doctor_id) backstops
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM patient_doctor_mappings WHERE patient_id = ? AND doctor_id = ?",
        )
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .fetch_optional(self.db.pool())
        .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict {
                error: DUPLICATE_PAIR.0,
                message: DUPLICATE_PAIR.1,
            });
        }

        let result = sqlx::query(
            "INSERT INTO patient_doctor_mappings (patient_id, doctor_id, notes, created_by)
             VALUES (?, ?, ?, ?)",
        )
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(&new.notes)
        .bind(owner)
        .execute(self.db.pool())
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PAIR.0, DUPLICATE_PAIR.1))?;

        let mapping = sqlx::query_as::<_, MappingDetail>(&format!("{DETAIL_QUERY} WHERE pdm.id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_one(self.db.pool())
            .await?;

        tracing::info!(mapping_id = mapping.id, owner, "assigned doctor to patient");
        Ok(mapping)
    }

    /// All mappings created by the caller, newest assignment first
    pub async fn list(&self, owner: i64) -> Result<Vec<MappingDetail>, ServiceError> {
        let mappings = sqlx::query_as::<_, MappingDetail>(&format!(
            "{DETAIL_QUERY} WHERE pdm.created_by = ? ORDER BY pdm.assigned_date DESC, pdm.id DESC"
        ))
        .bind(owner)
        .fetch_all(self.db.pool())
        .await?;
        Ok(mappings)
    }

    /// Doctors assigned to one of the caller's patients. The patient
    /// ownership check runs before the join so nothing about mappings or
    /// doctors leaks for patients the caller cannot see.
    pub async fn doctors_for_patient(
        &self,
        owner: i64,
        patient_id: i64,
    ) -> Result<(Patient, Vec<AssignedDoctor>), ServiceError> {
        let patients = PatientService::new(self.db.clone());
        let Some(patient) = patients.find_owned(owner, patient_id).await? else {
            return Err(ServiceError::NotFound {
                error: "Patient not found",
                message: "Patient does not exist or you do not have permission to view it",
            });
        };

        let doctors = sqlx::query_as::<_, AssignedDoctor>(
            "SELECT d.id, d.name, d.email, d.phone, d.specialization, d.license_number,
                    d.years_of_experience, pdm.assigned_date, pdm.notes, pdm.id AS mapping_id
             FROM doctors d
             JOIN patient_doctor_mappings pdm ON d.id = pdm.doctor_id
             WHERE pdm.patient_id = ? AND pdm.created_by = ?
             ORDER BY pdm.assigned_date DESC, pdm.id DESC",
        )
        .bind(patient_id)
        .bind(owner)
        .fetch_all(self.db.pool())
        .await?;

        Ok((patient, doctors))
    }

    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), ServiceError> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM patient_doctor_mappings WHERE id = ? AND created_by = ?",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.db.pool())
        .await?;
        if existing.is_none() {
            return Err(ServiceError::NotFound {
                error: "Mapping not found",
                message: "Mapping does not exist or you do not have permission to delete it",
            });
        }

        sqlx::query("DELETE FROM patient_doctor_mappings WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner)
            .execute(self.db.pool())
            .await?;

        tracing::info!(mapping_id = id, owner, "unassigned doctor from patient");
        Ok(())
    }
}
