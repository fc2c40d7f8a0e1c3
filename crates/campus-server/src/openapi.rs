use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus API",
        version = "0.1.0",
        description = "Student, course, and enrollment records with JWT bearer authentication."
    ),
    paths(
        crate::routes::create_student,
        crate::routes::create_students_batch,
        crate::routes::list_students,
        crate::routes::search_students,
        crate::routes::get_student,
        crate::routes::update_student,
        crate::routes::delete_student,
        crate::routes::enroll_student,
        crate::routes::student_courses,
        crate::routes::create_course,
        crate::routes::create_courses_batch,
        crate::routes::list_courses,
        crate::routes::get_course,
        crate::routes::update_course,
        crate::routes::delete_course,
        crate::routes::sign_up,
        crate::routes::sign_in,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::ApiResponse,
        crate::dto::BatchEntry,
        crate::dto::CreateStudentRequest,
        crate::dto::CreateCourseRequest,
        crate::dto::EnrollRequest,
        crate::dto::SignUpRequest,
        crate::dto::SignInRequest,
        crate::dto::HealthResponse,
    )),
    tags(
        (name = "students", description = "Student records and enrollment"),
        (name = "courses", description = "Course catalog"),
        (name = "auth", description = "Account registration and sign-in"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token issued by POST /api/signin."))
                        .build(),
                ),
            );
        }
    }
}
