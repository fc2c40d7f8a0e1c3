use std::str::FromStr;

use campus_core::update::{FieldDiff, FieldValue};
use campus_core::AppError;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::config::DatabaseConfig;
use crate::course_repository::CourseRepository;
use crate::student_repository::StudentRepository;
use crate::user_repository::UserRepository;

/// Schema creation is idempotent and runs on every startup; there is no
/// separate migration tooling.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        age INTEGER NOT NULL,
        phone TEXT,
        address TEXT,
        gender TEXT,
        enrollment_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        deleted_at TEXT
    )"#,
    // Email uniqueness only applies among non-deleted students; the
    // update path relies on this index, not just the insert pre-check.
    r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_students_active_email
        ON students(email) WHERE deleted_at IS NULL"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('student', 'teacher'))
    )"#,
    r#"CREATE TABLE IF NOT EXISTS courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_code TEXT NOT NULL UNIQUE,
        course_name TEXT NOT NULL UNIQUE,
        description TEXT,
        credits INTEGER NOT NULL,
        instructor TEXT,
        department TEXT,
        semester TEXT,
        academic_year TEXT,
        capacity INTEGER,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS enrollments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(id),
        course_id INTEGER NOT NULL REFERENCES courses(id),
        enrolled_at TEXT NOT NULL,
        UNIQUE (student_id, course_id)
    )"#,
];

/// Central database facade. Owns the connection pool, creates the
/// schema, and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and create if missing) the SQLite database behind the
    /// configured URL.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::Config(format!("Invalid DATABASE_URL '{}': {e}", config.url)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create all tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Schema creation failed: {e}")))?;
        }
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a [`StudentRepository`] backed by this pool.
    pub fn student_repo(&self) -> StudentRepository {
        StudentRepository::new(self.pool.clone())
    }

    /// Get a [`CourseRepository`] backed by this pool.
    pub fn course_repo(&self) -> CourseRepository {
        CourseRepository::new(self.pool.clone())
    }

    /// Get a [`UserRepository`] backed by this pool.
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// True when the error is SQLite's unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

/// Bind every diff value onto the query, in `set_clause` order.
pub(crate) fn bind_diff<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    diff: &'q FieldDiff,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in diff.values() {
        query = match value {
            FieldValue::Text(s) => query.bind(s.as_str()),
            FieldValue::Int(i) => query.bind(*i),
            FieldValue::Timestamp(t) => query.bind(*t),
        };
    }
    query
}
