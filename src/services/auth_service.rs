use crate::auth::{self, Claims};
use crate::database::models::{NewUser, User};
use crate::database::Database;

use super::{conflict_on_unique, ServiceError};

const DUPLICATE_EMAIL: (&str, &str) =
    ("User already exists", "A user with this email already exists");

/// Registration and credential verification. Produces the bearer tokens
/// consumed by the authentication middleware.
pub struct AuthService {
    db: Database,
}

impl AuthService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn register(&self, new: &NewUser) -> Result<(User, String), ServiceError> {
        // Friendly pre-check; the UNIQUE constraint on email is the backstop
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
            .bind(&new.email)
            .fetch_optional(self.db.pool())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict {
                error: DUPLICATE_EMAIL.0,
                message: DUPLICATE_EMAIL.1,
            });
        }

        let hash = auth::hash_password(&new.email, &new.password);
        let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(&new.name)
            .bind(&new.email)
            .bind(&hash)
            .execute(self.db.pool())
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL.0, DUPLICATE_EMAIL.1))?;

        let user = self.fetch(result.last_insert_rowid()).await?;
        let token = auth::generate_jwt(Claims::new(user.id, user.email.clone()))?;

        tracing::info!(user_id = user.id, "registered new user");
        Ok((user, token))
    }

    /// Verify credentials and mint a token. A wrong email and a wrong
    /// password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ServiceError> {
        let invalid = ServiceError::Unauthorized {
            error: "Invalid credentials",
            message: "Email or password is incorrect",
        };

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(user) = user else { return Err(invalid) };
        if !auth::verify_password(&user.email, password, &user.password) {
            return Err(invalid);
        }

        let token = auth::generate_jwt(Claims::new(user.id, user.email.clone()))?;
        Ok((user, token))
    }

    async fn fetch(&self, id: i64) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await
    }
}
