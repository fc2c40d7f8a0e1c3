use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use validator::Validate;

use campus_core::error::AppError;
use campus_core::models::{CourseUpdate, NewUser, Role, StudentUpdate};
use campus_core::{hash_password, verify_password};

use crate::auth::{CurrentUser, require_auth};
use crate::dto::{
    ApiResponse, BatchEntry, CreateCourseRequest, CreateStudentRequest, EnrollRequest,
    HealthResponse, SearchQuery, SignInRequest, SignUpRequest, to_json,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/students", post(create_student))
        .route("/api/students", get(list_students))
        .route("/api/students/batch", post(create_students_batch))
        .route("/api/students/search", get(search_students))
        .route("/api/students/{id}", get(get_student))
        .route("/api/students/{id}", put(update_student))
        .route("/api/students/{id}", delete(delete_student))
        .route("/api/students/{id}/enroll", post(enroll_student))
        .route("/api/students/{id}/courses", get(student_courses))
        .route("/api/courses", post(create_course))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/batch", post(create_courses_batch))
        .route("/api/courses/{id}", get(get_course))
        .route("/api/courses/{id}", put(update_course))
        .route("/api/courses/{id}", delete(delete_course))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/api/signup", post(sign_up))
        .route("/api/signin", post(sign_in))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

// ---------------------------------------------------------------------------
// Request plumbing
// ---------------------------------------------------------------------------

/// Decode a JSON request body. An empty body and a malformed body are
/// reported as distinct client errors.
fn decode_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("empty body".into()).into());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")).into())
}

/// Run validator checks and fold failures into one message of the form
/// `field X is required, field Y is invalid`, fields in sorted order so
/// the output is deterministic.
fn validate(payload: &impl Validate) -> Result<(), ApiError> {
    let Err(errors) = payload.validate() else {
        return Ok(());
    };

    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let required = errs.iter().any(|e| e.code == "required");
            if required {
                format!("field {field} is required")
            } else {
                format!("field {field} is invalid")
            }
        })
        .collect();
    messages.sort();

    Err(AppError::Validation(messages.join(", ")).into())
}

/// Parse a path segment as a numeric id.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        AppError::BadRequest("invalid ID format. Please enter a valid number".into()).into()
    })
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 409, description = "Duplicate email", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: CreateStudentRequest = decode_json(&body)?;
    validate(&request)?;

    let id = state.db.student_repo().create(&request.into_new()?).await?;
    info!(student_id = id, "student created");

    Ok(ApiResponse::ok(
        "Student created successfully",
        StatusCode::CREATED,
        json!({ "id": id }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/students/batch",
    request_body = Vec<CreateStudentRequest>,
    responses(
        (status = 201, description = "Per-item results in input order", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn create_students_batch(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let requests: Vec<CreateStudentRequest> = decode_json(&body)?;
    let repo = state.db.student_repo();

    // One record per input element, in input order. A failed element
    // never aborts the rest of the batch.
    let mut records = Vec::with_capacity(requests.len());
    for request in requests {
        let outcome = async {
            validate(&request)?;
            let id = repo.create(&request.into_new()?).await?;
            repo.get(id).await.map_err(ApiError::from)
        }
        .await;

        records.push(match outcome {
            Ok(student) => BatchEntry {
                success: true,
                data: json!({ "student": student }),
            },
            Err(err) => BatchEntry {
                success: false,
                data: json!({ "message": "failed", "reason": err.0.to_string() }),
            },
        });
    }

    Ok(ApiResponse::ok(
        "Batch creation completed",
        StatusCode::CREATED,
        to_json(&records)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "All active students", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let students = state.db.student_repo().list().await?;

    Ok(ApiResponse::ok(
        "Students retrieved successfully",
        StatusCode::OK,
        to_json(&students)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching students", body = ApiResponse),
        (status = 400, description = "Empty query", body = ApiResponse),
        (status = 404, description = "No matches", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn search_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let needle = query.query.unwrap_or_default();
    if needle.is_empty() {
        return Err(AppError::BadRequest("please enter something to search".into()).into());
    }

    let students = state.db.student_repo().search(&needle).await?;
    if students.is_empty() {
        return Err(AppError::NotFound(format!("no students found matching '{needle}'")).into());
    }

    Ok(ApiResponse::ok(
        "Students retrieved successfully",
        StatusCode::OK,
        to_json(&students)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let student = state.db.student_repo().get(id).await?;

    Ok(ApiResponse::ok(
        "Student details retrieved successfully",
        StatusCode::OK,
        to_json(&student)?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Student updated", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 409, description = "Duplicate email", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let update: StudentUpdate = decode_json(&body)?;

    // Student status is free-form; only courses restrict it.
    state.db.student_repo().update(id, &update.to_diff()).await?;

    Ok(ApiResponse::ok(
        "Student updated successfully",
        StatusCode::OK,
        json!({ "message": "success", "id": id }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.db.student_repo().soft_delete(id).await?;

    Ok(ApiResponse::ok(
        "Student deleted successfully",
        StatusCode::OK,
        json!({ "message": "success", "id": id }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/enroll",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrollment created", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 404, description = "Unknown student or course", body = ApiResponse),
        (status = 409, description = "Already enrolled", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn enroll_student(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let request: EnrollRequest = decode_json(&body)?;
    validate(&request)?;
    let Some(course_id) = request.course_id else {
        return Err(AppError::Validation("field course_id is required".into()).into());
    };

    let enrollment = state.db.student_repo().enroll(id, course_id).await?;
    info!(
        student_id = id,
        course_id,
        operator = %user.email,
        "student enrolled"
    );

    Ok(ApiResponse::ok(
        "Student enrolled successfully",
        StatusCode::CREATED,
        json!({ "enrollment": enrollment }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/courses",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student with their courses", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "students"
)]
pub async fn student_courses(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let detail = state.db.student_repo().with_courses(id).await?;

    Ok(ApiResponse::ok(
        "Student courses retrieved successfully",
        StatusCode::OK,
        to_json(&detail)?,
    ))
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 409, description = "Duplicate code or name", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: CreateCourseRequest = decode_json(&body)?;
    validate(&request)?;

    let course = state.db.course_repo().create(&request.into_new()?).await?;
    info!(course_id = course.id, code = %course.course_code, "course created");

    Ok(ApiResponse::ok(
        "Course created successfully",
        StatusCode::CREATED,
        to_json(&course)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/courses/batch",
    request_body = Vec<CreateCourseRequest>,
    responses(
        (status = 201, description = "Per-item results in input order", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn create_courses_batch(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let requests: Vec<CreateCourseRequest> = decode_json(&body)?;
    let repo = state.db.course_repo();

    let mut records = Vec::with_capacity(requests.len());
    for request in requests {
        let outcome = async {
            validate(&request)?;
            repo.create(&request.into_new()?).await.map_err(ApiError::from)
        }
        .await;

        records.push(match outcome {
            Ok(course) => BatchEntry {
                success: true,
                data: json!({ "course": course }),
            },
            Err(err) => BatchEntry {
                success: false,
                data: json!({ "message": "failed", "reason": err.0.to_string() }),
            },
        });
    }

    Ok(ApiResponse::ok(
        "Batch creation completed",
        StatusCode::CREATED,
        to_json(&records)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "All courses", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = state.db.course_repo().list().await?;

    Ok(ApiResponse::ok(
        "Courses retrieved successfully",
        StatusCode::OK,
        to_json(&courses)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details with enrolled students", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let course = state.db.course_repo().get(id).await?;

    Ok(ApiResponse::ok(
        "Course details retrieved successfully",
        StatusCode::OK,
        to_json(&course)?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated course", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 409, description = "Duplicate code or name", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let update: CourseUpdate = decode_json(&body)?;
    check_status(update.status.as_deref())?;

    let course = state.db.course_repo().update(id, &update.to_diff()).await?;

    Ok(ApiResponse::ok(
        "Course updated successfully",
        StatusCode::OK,
        to_json(&course)?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "courses"
)]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.db.course_repo().delete(id).await?;

    Ok(ApiResponse::ok(
        "Course deleted successfully",
        StatusCode::OK,
        json!({ "message": "success", "id": id }),
    ))
}

/// `status` only admits the two lifecycle values.
fn check_status(status: Option<&str>) -> Result<(), ApiError> {
    match status {
        None | Some("active") | Some("inactive") => Ok(()),
        Some(_) => Err(AppError::Validation("field status is invalid".into()).into()),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 409, description = "Email already registered", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: SignUpRequest = decode_json(&body)?;
    validate(&request)?;
    let (Some(name), Some(email), Some(password), Some(role)) =
        (request.name, request.email, request.password, request.role)
    else {
        return Err(AppError::Validation("missing required fields".into()).into());
    };

    let role: Role = role
        .to_lowercase()
        .parse()
        .map_err(|_| AppError::Validation("field role is invalid".into()))?;

    let repo = state.db.user_repo();
    if repo.is_email_taken(&email).await? {
        return Err(AppError::Conflict(format!(
            "user with email {email} already exists. please try again with different email"
        ))
        .into());
    }

    let new_user = NewUser {
        name,
        email,
        password: hash_password(&password)?,
        role,
    };
    let id = repo.create(&new_user).await?;
    info!(user_id = id, role = %new_user.role, "user signed up");

    Ok(ApiResponse::ok(
        "user created successfully",
        StatusCode::CREATED,
        json!({
            "id": id,
            "name": new_user.name,
            "email": new_user.email,
            "role": new_user.role,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 401, description = "Invalid credentials", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: SignInRequest = decode_json(&body)?;
    validate(&request)?;
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(AppError::Validation("missing required fields".into()).into());
    };

    // Unknown email and wrong password collapse into the same reply.
    let user = match state.db.user_repo().get_by_email(&email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("invalid email or password".into()).into());
        }
        Err(err) => return Err(err.into()),
    };

    if !verify_password(&password, &user.password) {
        return Err(AppError::Unauthorized("invalid email or password".into()).into());
    }

    let issued = state.tokens.issue(&user)?;
    info!(user_id = user.id, "user signed in");

    Ok(ApiResponse::ok(
        "login successful",
        StatusCode::OK,
        json!({ "token": issued.token, "expires_in": issued.expires_at }),
    ))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
