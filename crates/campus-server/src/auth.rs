use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use campus_core::models::Role;

use crate::dto::ApiResponse;
use crate::state::AppState;

/// Identity of the caller, decoded from the bearer token and inserted
/// into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// Middleware that validates `Authorization: Bearer <token>` against the
/// configured signing key and exposes the caller as a [`CurrentUser`]
/// extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let Some(header) = auth_header else {
        return unauthorized("missing authorization header");
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return unauthorized("invalid authorization header format");
    };

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(err) => return unauthorized(&err.to_string()),
    };

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    ApiResponse::error(message, StatusCode::UNAUTHORIZED).into_response()
}
