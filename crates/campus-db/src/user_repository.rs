use campus_core::error::AppError;
use campus_core::models::{NewUser, Role, User};
use sqlx::SqlitePool;

use crate::database::is_unique_violation;

/// Repository for credential records.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// True if a user with this email is already registered.
    pub async fn is_email_taken(&self, email: &str) -> Result<bool, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Insert a user record; the password is already hashed by the
    /// caller. Returns the generated id.
    pub async fn create(&self, new: &NewUser) -> Result<i64, AppError> {
        let result =
            sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?)")
                .bind(&new.name)
                .bind(&new.email)
                .bind(&new.password)
                .bind(new.role.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::Conflict(format!(
                            "user with email {} already exists",
                            new.email
                        ))
                    } else {
                        AppError::Database(e.to_string())
                    }
                })?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch a user by email. The `NotFound` here is a sentinel the
    /// sign-in handler maps to `Unauthorized` so callers cannot probe
    /// which emails are registered.
    pub async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password, role FROM users WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::NotFound("user not found with this email".into())),
        }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        // The CHECK constraint keeps this from failing in practice.
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| AppError::Database(e))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role,
        })
    }
}
