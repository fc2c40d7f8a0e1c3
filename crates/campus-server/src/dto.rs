use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use campus_core::error::AppError;
use campus_core::models::{NewCourse, NewStudent};

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The uniform response shape: `{status, success, message, data}`.
/// Every handler, success or error, replies with this envelope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiResponse {
    /// HTTP status code, mirrored into the body.
    pub status: u16,
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object, nullable)]
    pub data: Value,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, status: StatusCode, data: Value) -> Self {
        Self {
            status: status.as_u16(),
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            success: false,
            message: message.into(),
            data: Value::Null,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

/// One record per input element of a batch request, in input order.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BatchEntry {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Serialize a payload into envelope data.
pub fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(AppError::from)
        .map_err(ApiError::from)
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// Create payload. Required fields are `Option` so a missing field maps
/// to a "field X is required" validation message instead of a decode
/// failure.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    #[validate(required)]
    pub name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required)]
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
}

impl CreateStudentRequest {
    /// Unwrap the required fields after validation has passed.
    pub fn into_new(self) -> Result<NewStudent, ApiError> {
        let (Some(name), Some(email), Some(age)) = (self.name, self.email, self.age) else {
            return Err(AppError::Validation("missing required fields".into()).into());
        };
        Ok(NewStudent {
            name,
            email,
            age,
            phone: self.phone,
            address: self.address,
            gender: self.gender,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct EnrollRequest {
    #[validate(required)]
    pub course_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    #[validate(required)]
    pub course_code: Option<String>,
    #[validate(required)]
    pub course_name: Option<String>,
    pub description: Option<String>,
    #[validate(required)]
    pub credits: Option<i64>,
    pub instructor: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<i64>,
    /// "active" or "inactive"; defaults to "active".
    pub status: Option<String>,
}

impl CreateCourseRequest {
    pub fn into_new(self) -> Result<NewCourse, ApiError> {
        if let Some(status) = self.status.as_deref() {
            if status != "active" && status != "inactive" {
                return Err(AppError::Validation("field status is invalid".into()).into());
            }
        }
        let (Some(course_code), Some(course_name), Some(credits)) =
            (self.course_code, self.course_name, self.credits)
        else {
            return Err(AppError::Validation("missing required fields".into()).into());
        };
        Ok(NewCourse {
            course_code,
            course_name,
            description: self.description,
            credits,
            instructor: self.instructor,
            department: self.department,
            semester: self.semester,
            academic_year: self.academic_year,
            capacity: self.capacity,
            status: self.status,
        })
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignUpRequest {
    #[validate(required)]
    pub name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
    /// "student" or "teacher", case-insensitive.
    #[validate(required)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignInRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}
