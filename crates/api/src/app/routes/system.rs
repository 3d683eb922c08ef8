use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use keygate_auth::AuthenticatedPrincipal;

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Public sample payload.
pub async fn test_json_view() -> impl IntoResponse {
    Json(json!({
        "name": "John Doe",
        "age": 30,
        "location": "New York",
        "is_active": true,
    }))
}

pub async fn whoami(Extension(principal): Extension<AuthenticatedPrincipal>) -> impl IntoResponse {
    let permissions: Vec<&str> = principal
        .role()
        .map(|r| r.codes().into_iter().map(|c| c.as_str()).collect())
        .unwrap_or_default();

    Json(json!({
        "principal_id": principal.principal_id().to_string(),
        "username": principal.username(),
        "email": principal.identity().email,
        "role": principal.role_name(),
        "permissions": permissions,
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
