use crate::database::models::{Doctor, NewDoctor};
use crate::database::Database;

use super::{conflict_on_unique, ServiceError};

const DUPLICATE_LICENSE: (&str, &str) =
    ("Doctor already exists", "A doctor with this license number already exists");
const DUPLICATE_EMAIL: (&str, &str) =
    ("Doctor already exists", "A doctor with this email already exists");
const LICENSE_CONFLICT: (&str, &str) =
    ("License number conflict", "Another doctor with this license number already exists");
const EMAIL_CONFLICT: (&str, &str) =
    ("Email conflict", "Another doctor with this email already exists");

/// Doctors are directory data: every authenticated user can read them, and
/// update/delete accept any authenticated caller. Creation still records
/// `created_by` so user-deletion cascades stay well defined.
pub struct DoctorService {
    db: Database,
}

impl DoctorService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn not_found() -> ServiceError {
        ServiceError::NotFound { error: "Doctor not found", message: "Doctor does not exist" }
    }

    pub async fn create(&self, owner: i64, new: &NewDoctor) -> Result<Doctor, ServiceError> {
        // License uniqueness pre-check; the UNIQUE constraint is the backstop
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM doctors WHERE license_number = ?")
            .bind(&new.license_number)
            .fetch_optional(self.db.pool())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict {
                error: DUPLICATE_LICENSE.0,
                message: DUPLICATE_LICENSE.1,
            });
        }

        // doctors.email is UNIQUE too; pre-check it so the 409 names the
        // right field
        if let Some(email) = &new.email {
            let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM doctors WHERE email = ?")
                .bind(email)
                .fetch_optional(self.db.pool())
                .await?;
            if existing.is_some() {
                return Err(ServiceError::Conflict {
                    error: DUPLICATE_EMAIL.0,
                    message: DUPLICATE_EMAIL.1,
                });
            }
        }

        let result = sqlx::query(
            "INSERT INTO doctors (name, email, phone, specialization, license_number, years_of_experience, created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.specialization)
        .bind(&new.license_number)
        .bind(new.years_of_experience)
        .bind(owner)
        .execute(self.db.pool())
        .await
        // Under a racing insert the engine does not say which UNIQUE column
        // fired, so the backstop names the license number
        .map_err(|e| conflict_on_unique(e, DUPLICATE_LICENSE.0, DUPLICATE_LICENSE.1))?;

        let doctor = self.fetch(result.last_insert_rowid()).await?;
        tracing::info!(doctor_id = doctor.id, "created doctor");
        Ok(doctor)
    }

    /// Full directory, ordered by name
    pub async fn list(&self) -> Result<Vec<Doctor>, ServiceError> {
        let doctors = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;
        Ok(doctors)
    }

    pub async fn get(&self, id: i64) -> Result<Doctor, ServiceError> {
        sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(Self::not_found)
    }

    pub async fn update(&self, id: i64, new: &NewDoctor) -> Result<Doctor, ServiceError> {
        let existing = self.get(id).await?;

        // Only re-check uniqueness when the license number actually changes
        if new.license_number != existing.license_number {
            let conflicting = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM doctors WHERE license_number = ? AND id != ?",
            )
            .bind(&new.license_number)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
            if conflicting.is_some() {
                return Err(ServiceError::Conflict {
                    error: LICENSE_CONFLICT.0,
                    message: LICENSE_CONFLICT.1,
                });
            }
        }

        if new.email.is_some() && new.email != existing.email {
            let conflicting = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM doctors WHERE email = ? AND id != ?",
            )
            .bind(&new.email)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
            if conflicting.is_some() {
                return Err(ServiceError::Conflict {
                    error: EMAIL_CONFLICT.0,
                    message: EMAIL_CONFLICT.1,
                });
            }
        }

        sqlx::query(
            "UPDATE doctors SET
             name = ?, email = ?, phone = ?, specialization = ?,
             license_number = ?, years_of_experience = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.specialization)
        .bind(&new.license_number)
        .bind(new.years_of_experience)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(|e| conflict_on_unique(e, LICENSE_CONFLICT.0, LICENSE_CONFLICT.1))?;

        self.fetch(id).await.map_err(Into::into)
    }

    /// Deletion cascades to all mappings referencing this doctor
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get(id).await?;

        sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        tracing::info!(doctor_id = id, "deleted doctor");
        Ok(())
    }

    async fn fetch(&self, id: i64) -> Result<Doctor, sqlx::Error> {
        sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::services::AuthService;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        let auth = AuthService::new(db.clone());
        let (a, _) = auth
            .register(&NewUser {
                name: "A".into(),
                email: "a@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        let (b, _) = auth
            .register(&NewUser {
                name: "B".into(),
                email: "b@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        (db, a.id, b.id)
    }

    fn sample(license: &str) -> NewDoctor {
        NewDoctor {
            name: "Dr. Smith".into(),
            email: None,
            phone: None,
            specialization: "Cardiology".into(),
            license_number: license.into(),
            years_of_experience: 12,
        }
    }

    #[tokio::test]
    async fn duplicate_license_conflicts() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        service.create(a, &sample("LIC-1000")).await.unwrap();
        let err = service.create(a, &sample("LIC-1000")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
    }

    #[tokio::test]
    async fn doctors_are_visible_and_writable_by_any_user() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        let doctor = service.create(a, &sample("LIC-2000")).await.unwrap();
        assert_eq!(doctor.created_by, a);

        // No caller scoping on reads or writes; the creator is recorded only
        // for cascade purposes
        assert!(service.get(doctor.id).await.is_ok());
        let mut change = sample("LIC-2000");
        change.name = "Dr. Jones".into();
        let updated = service.update(doctor.id, &change).await.unwrap();
        assert_eq!(updated.name, "Dr. Jones");
        service.delete(doctor.id).await.unwrap();
        assert!(service.get(doctor.id).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_with_email_message() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        let mut first = sample("LIC-5000");
        first.email = Some("shared@clinic.test".into());
        service.create(a, &first).await.unwrap();

        // Different license, same email: the 409 must name the email
        let mut second = sample("LIC-5001");
        second.email = Some("shared@clinic.test".into());
        let err = service.create(a, &second).await.unwrap_err();
        match err {
            ServiceError::Conflict { message, .. } => {
                assert!(message.contains("email"), "got: {}", message);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn email_change_checks_for_conflicts() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        let mut first = sample("LIC-6000");
        first.email = Some("taken@clinic.test".into());
        service.create(a, &first).await.unwrap();
        let second = service.create(a, &sample("LIC-6001")).await.unwrap();

        let mut change = sample("LIC-6001");
        change.email = Some("taken@clinic.test".into());
        let err = service.update(second.id, &change).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
    }

    #[tokio::test]
    async fn license_change_checks_for_conflicts() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        service.create(a, &sample("LIC-3000")).await.unwrap();
        let second = service.create(a, &sample("LIC-3001")).await.unwrap();

        // Moving second onto the first license must conflict
        let err = service.update(second.id, &sample("LIC-3000")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));

        // Updating without changing the license is fine
        let ok = service.update(second.id, &sample("LIC-3001")).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let (db, a, _) = setup().await;
        let service = DoctorService::new(db);
        let mut zed = sample("LIC-4000");
        zed.name = "Dr. Zed".into();
        let mut abe = sample("LIC-4001");
        abe.name = "Dr. Abe".into();
        service.create(a, &zed).await.unwrap();
        service.create(a, &abe).await.unwrap();

        let doctors = service.list().await.unwrap();
        assert_eq!(doctors[0].name, "Dr. Abe");
        assert_eq!(doctors[1].name, "Dr. Zed");
    }
}
