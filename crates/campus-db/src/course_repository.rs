use campus_core::error::AppError;
use campus_core::models::{Course, NewCourse, STATUS_ACTIVE};
use campus_core::update::{FieldDiff, FieldValue};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::{bind_diff, is_unique_violation};

const COURSE_COLUMNS: &str = "id, course_code, course_name, description, credits, instructor, \
     department, semester, academic_year, capacity, status, created_at, updated_at";

/// Repository for course persistence. Courses are hard-deleted, unlike
/// students.
#[derive(Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new course. `course_code` and `course_name` carry unique
    /// constraints; a violation surfaces as `Conflict`.
    pub async fn create(&self, new: &NewCourse) -> Result<Course, AppError> {
        let now = Utc::now();
        let status = new.status.as_deref().unwrap_or(STATUS_ACTIVE);

        let result = sqlx::query(
            r#"
            INSERT INTO courses
                (course_code, course_name, description, credits, instructor,
                department, semester, academic_year, capacity, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.course_code)
        .bind(&new.course_name)
        .bind(&new.description)
        .bind(new.credits)
        .bind(&new.instructor)
        .bind(&new.department)
        .bind(&new.semester)
        .bind(&new.academic_year)
        .bind(new.capacity)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "course {} already exists",
                    new.course_code
                ))
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        self.get(result.last_insert_rowid()).await
    }

    /// Fetch a course by id, with the ids of its enrolled students.
    pub async fn get(&self, id: i64) -> Result<Course, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ? LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut course: Course = row
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("no course found for this id".to_string()))?;

        course.enrolled_students = self.enrolled_student_ids(id).await?;
        Ok(course)
    }

    async fn enrolled_student_ids(&self, course_id: i64) -> Result<Vec<i64>, AppError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT student_id FROM enrollments WHERE course_id = ? ORDER BY enrolled_at",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// All courses, in insertion order. Enrolled-student ids are not
    /// populated on the list path.
    pub async fn list(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update; `updated_at` is always refreshed.
    pub async fn update(&self, id: i64, diff: &FieldDiff) -> Result<Course, AppError> {
        if diff.is_empty() {
            return Err(AppError::BadRequest("no fields to update".into()));
        }

        let mut diff = diff.clone();
        diff.set("updated_at", FieldValue::Timestamp(Utc::now()));

        let sql = format!("UPDATE courses SET {} WHERE id = ?", diff.set_clause());
        let query = bind_diff(sqlx::query(&sql), &diff).bind(id);

        let result = query.execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("course with this code or name already exists".into())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "no course found for the given id".to_string(),
            ));
        }

        self.get(id).await
    }

    /// Hard delete. Returns the deleted id; `NotFound` on zero rows.
    pub async fn delete(&self, id: i64) -> Result<i64, AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "no course found for the given id".to_string(),
            ));
        }
        Ok(id)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
pub(crate) struct CourseRow {
    id: i64,
    course_code: String,
    course_name: String,
    description: Option<String>,
    credits: i64,
    instructor: Option<String>,
    department: Option<String>,
    semester: Option<String>,
    academic_year: Option<String>,
    capacity: Option<i64>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            course_code: row.course_code,
            course_name: row.course_name,
            description: row.description,
            credits: row.credits,
            instructor: row.instructor,
            department: row.department,
            semester: row.semester,
            academic_year: row.academic_year,
            capacity: row.capacity,
            enrolled_students: Vec::new(),
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
