use campus_core::error::AppError;
use campus_core::models::{
    Enrollment, NewStudent, Student, StudentWithCourses, STATUS_ACTIVE,
};
use campus_core::update::FieldDiff;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::course_repository::CourseRow;
use crate::database::{bind_diff, is_unique_violation};

const STUDENT_COLUMNS: &str =
    "id, name, email, age, phone, address, gender, enrollment_date, status, deleted_at";

/// Repository for student persistence, including enrollment.
#[derive(Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new student with status "active" and the current
    /// enrollment date. Returns the generated id. Fails with `Conflict`
    /// if the email is already used by a non-deleted student.
    pub async fn create(&self, new: &NewStudent) -> Result<i64, AppError> {
        if self.email_exists(&new.email).await? {
            return Err(AppError::Conflict(format!(
                "student with this email {} already exists",
                new.email
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO students (name, email, age, phone, address, gender, enrollment_date, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.age)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(&new.gender)
        .bind(Utc::now())
        .bind(STATUS_ACTIVE)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM students WHERE email = ? AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Fetch a student by id. Soft-deleted rows count as absent.
    pub async fn get(&self, id: i64) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("no student found for the id {id}")))
    }

    /// All non-deleted students, in insertion order.
    pub async fn list(&self) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE deleted_at IS NULL"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft-delete: set the deletion timestamp. Deleting an already
    /// soft-deleted id affects zero rows and reports `NotFound`.
    pub async fn soft_delete(&self, id: i64) -> Result<i64, AppError> {
        let result = sqlx::query(
            "UPDATE students SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "no student found for the id {id}"
            )));
        }
        Ok(id)
    }

    /// Apply a partial update built from the present fields only.
    pub async fn update(&self, id: i64, diff: &FieldDiff) -> Result<i64, AppError> {
        if diff.is_empty() {
            return Err(AppError::BadRequest("no fields to update".into()));
        }

        let sql = format!(
            "UPDATE students SET {} WHERE id = ? AND deleted_at IS NULL",
            diff.set_clause()
        );
        let query = bind_diff(sqlx::query(&sql), diff).bind(id);

        let result = query.execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("student with this email already exists".into())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "no student found for the id {id}"
            )));
        }
        Ok(id)
    }

    /// Case-sensitive substring match on name among non-deleted students.
    pub async fn search(&self, query: &str) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE deleted_at IS NULL AND instr(name, ?) > 0"
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Enroll a student in a course. Both must exist; enrolling twice in
    /// the same course is a `Conflict`.
    pub async fn enroll(&self, student_id: i64, course_id: i64) -> Result<Enrollment, AppError> {
        self.get(student_id).await?;
        self.course_exists(course_id).await?;

        let enrolled_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO enrollments (student_id, course_id, enrolled_at) VALUES (?, ?, ?)",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "student {student_id} is already enrolled in course {course_id}"
                ))
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Ok(Enrollment {
            id: result.last_insert_rowid(),
            student_id,
            course_id,
            enrolled_at,
        })
    }

    async fn course_exists(&self, course_id: i64) -> Result<(), AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM courses WHERE id = ? LIMIT 1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!(
                "no course found for the id {course_id}"
            ))),
        }
    }

    /// A student joined with the details of every course they are
    /// enrolled in.
    pub async fn with_courses(&self, student_id: i64) -> Result<StudentWithCourses, AppError> {
        let student = self.get(student_id).await?;

        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT c.*
            FROM courses c
            JOIN enrollments e ON e.course_id = c.id
            WHERE e.student_id = ?
            ORDER BY e.enrolled_at
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(StudentWithCourses {
            student,
            courses: rows.into_iter().map(Into::into).collect(),
        })
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    email: String,
    age: i64,
    phone: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    enrollment_date: DateTime<Utc>,
    status: String,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            name: row.name,
            email: row.email,
            age: row.age,
            phone: row.phone,
            address: row.address,
            gender: row.gender,
            enrollment_date: row.enrollment_date,
            status: row.status,
            deleted_at: row.deleted_at,
        }
    }
}
