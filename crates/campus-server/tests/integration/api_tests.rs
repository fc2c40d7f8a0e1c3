use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{auth_token, course_payload, request, setup_test_app, student_payload};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, body) = request(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_then_signin_issues_token() {
    let app = setup_test_app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter22",
            "role": "STUDENT"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "user created successfully");
    assert_eq!(body["data"]["email"], "ada@example.com");
    // Role is normalized to lowercase and the hash never leaks.
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"].get("password").is_none());

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "login successful");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert!(body["data"]["expires_in"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn signup_duplicate_email_returns_409() {
    let app = setup_test_app().await;
    let payload = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "password": "hunter22",
        "role": "student"
    });

    let (status, _) = request(&app, Method::POST, "/api/signup", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(&app, Method::POST, "/api/signup", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn signup_unknown_role_returns_400() {
    let app = setup_test_app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter22",
            "role": "admin"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "field role is invalid");
}

#[tokio::test]
async fn signin_wrong_password_and_unknown_email_reply_alike() {
    let app = setup_test_app().await;
    let _ = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/signin",
        None,
        Some(json!({ "email": "teacher@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_message = body["message"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/signin",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], wrong_password_message.as_str());
}

#[tokio::test]
async fn missing_auth_header_returns_401() {
    let app = setup_test_app().await;

    let (status, body) = request(&app, Method::GET, "/api/students", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "missing authorization header");
}

#[tokio::test]
async fn non_bearer_scheme_returns_401() {
    let app = setup_test_app().await;

    let response = tower::ServiceExt::oneshot(
        app.clone(),
        axum::http::Request::get("/api/students")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "invalid authorization header format");
}

#[tokio::test]
async fn tampered_token_returns_401() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let mut tampered = token.clone();
    tampered.pop();
    tampered.push('x');

    let (status, body) = request(&app, Method::GET, "/api/students", Some(&tampered), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid or expired token");
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[tokio::test]
async fn student_crud_round_trip() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/students",
        Some(&token),
        Some(student_payload("Alice", "alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Student created successfully");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["status"], "active");

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/api/students/{id}"),
        Some(&token),
        Some(json!({ "age": 21 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "success");
    assert_eq!(body["data"]["id"], id);

    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        Method::GET,
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_student_with_empty_body_returns_400() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(&app, Method::POST, "/api/students", Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "empty body");
}

#[tokio::test]
async fn create_student_missing_fields_lists_them() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/students",
        Some(&token),
        Some(json!({ "name": "Alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("field age is required"));
    assert!(message.contains("field email is required"));
}

#[tokio::test]
async fn duplicate_student_email_returns_409() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let payload = student_payload("Alice", "alice@example.com");
    let (status, _) =
        request(&app, Method::POST, "/api/students", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        request(&app, Method::POST, "/api/students", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn batch_create_reports_each_item() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/students/batch",
        Some(&token),
        Some(json!([
            student_payload("Alice", "alice@example.com"),
            student_payload("Alice Again", "alice@example.com"),
            student_payload("Bob", "bob@example.com"),
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["success"], true);
    assert_eq!(records[0]["data"]["student"]["name"], "Alice");

    assert_eq!(records[1]["success"], false);
    assert_eq!(records[1]["data"]["message"], "failed");
    assert!(
        records[1]["data"]["reason"]
            .as_str()
            .unwrap()
            .contains("already")
    );

    assert_eq!(records[2]["success"], true);

    // The failed element left no row behind.
    let (_, body) = request(&app, Method::GET, "/api/students", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_requires_a_query() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/students/search",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "please enter something to search");
}

#[tokio::test]
async fn search_with_no_matches_returns_404() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/students/search?query=Zo",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("Zo"));
}

#[tokio::test]
async fn update_with_no_fields_returns_400() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/students",
        Some(&token),
        Some(student_payload("Alice", "alice@example.com")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/api/students/{id}"),
        Some(&token),
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no fields to update");
}

#[tokio::test]
async fn student_status_is_not_restricted_on_update() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/students",
        Some(&token),
        Some(student_payload("Alice", "alice@example.com")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        Method::PUT,
        &format!("/api/students/{id}"),
        Some(&token),
        Some(json!({ "status": "graduated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(
        &app,
        Method::GET,
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], "graduated");
}

#[tokio::test]
async fn malformed_id_returns_400() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/students/not-a-number",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("invalid ID"));
}

#[tokio::test]
async fn enrollment_flow() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/students",
        Some(&token),
        Some(student_payload("Alice", "alice@example.com")),
    )
    .await;
    let student_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/courses",
        Some(&token),
        Some(course_payload("CS101", "Intro to Computing")),
    )
    .await;
    let course_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        Method::POST,
        &format!("/api/students/{student_id}/enroll"),
        Some(&token),
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["enrollment"]["student_id"], student_id);
    assert_eq!(body["data"]["enrollment"]["course_id"], course_id);

    let (status, body) = request(
        &app,
        Method::POST,
        &format!("/api/students/{student_id}/enroll"),
        Some(&token),
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already enrolled"));

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/api/students/{student_id}/courses"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");
    let courses = body["data"]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["course_code"], "CS101");
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn course_crud_round_trip() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/courses",
        Some(&token),
        Some(course_payload("CS101", "Intro to Computing")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["course_code"], "CS101");
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/api/courses/{id}"),
        Some(&token),
        Some(json!({ "credits": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["credits"], 4);

    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/courses/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        Method::GET,
        &format!("/api/courses/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_course_code_returns_409() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/courses",
        Some(&token),
        Some(course_payload("CS101", "Intro to Computing")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/courses",
        Some(&token),
        Some(course_payload("CS101", "A Different Name")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn course_update_rejects_unknown_status() {
    let app = setup_test_app().await;
    let token = auth_token(&app).await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/courses",
        Some(&token),
        Some(course_payload("CS101", "Intro to Computing")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/api/courses/{id}"),
        Some(&token),
        Some(json!({ "status": "archived" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "field status is invalid");
}
