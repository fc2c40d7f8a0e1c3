use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::update::FieldDiff;

/// Default lifecycle status for newly created students and courses.
pub const STATUS_ACTIVE: &str = "active";

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// A student record as stored and returned by the API.
///
/// `deleted_at` is the soft-delete marker: rows with a timestamp here are
/// invisible to reads but never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated insert payload for a student. Optional contact fields stay
/// optional all the way into the row.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
}

/// Partial update for a student. `Some` means "assign this value",
/// `None` means "leave the column unchanged", the distinction between
/// a field sent as empty and a field not sent at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl StudentUpdate {
    /// Map the present fields onto column-assignment pairs.
    pub fn to_diff(&self) -> FieldDiff {
        let mut diff = FieldDiff::new();
        diff.push_text("name", self.name.clone());
        diff.push_text("email", self.email.clone());
        diff.push_int("age", self.age);
        diff.push_text("phone", self.phone.clone());
        diff.push_text("address", self.address.clone());
        diff.push_text("gender", self.gender.clone());
        diff.push_timestamp("enrollment_date", self.enrollment_date);
        diff.push_text("status", self.status.clone());
        diff
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// A course record. `course_code` and `course_name` are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credits: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    /// Ids of enrolled students, populated on get-by-id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enrolled_students: Vec<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated insert payload for a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_code: String,
    pub course_name: String,
    pub description: Option<String>,
    pub credits: i64,
    pub instructor: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
}

/// Partial update for a course. Same present/absent semantics as
/// [`StudentUpdate`]. `updated_at` is refreshed by the repository on
/// every successful update, not supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseUpdate {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i64>,
    pub instructor: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
}

impl CourseUpdate {
    pub fn to_diff(&self) -> FieldDiff {
        let mut diff = FieldDiff::new();
        diff.push_text("course_code", self.course_code.clone());
        diff.push_text("course_name", self.course_name.clone());
        diff.push_text("description", self.description.clone());
        diff.push_int("credits", self.credits);
        diff.push_text("instructor", self.instructor.clone());
        diff.push_text("department", self.department.clone());
        diff.push_text("semester", self.semester.clone());
        diff.push_text("academic_year", self.academic_year.clone());
        diff.push_int("capacity", self.capacity);
        diff.push_text("status", self.status.clone());
        diff
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Roles a credential record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Teacher => f.write_str("teacher"),
        }
    }
}

/// A credential record. `password` holds the Argon2id hash and is never
/// serialized into a response body.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

/// Insert payload for a user. `password` is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

/// Association between a student and a course.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

/// A student joined with the courses they are enrolled in.
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithCourses {
    #[serde(flatten)]
    pub student: Student,
    pub courses: Vec<Course>,
}
