use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use keygate_auth::{AuthenticatedPrincipal, codes};

use crate::app::dto::PostUserRequest;
use crate::app::errors::ApiError;
use crate::app::extract::JsonBody;
use crate::app::routes::method_not_allowed;
use crate::authz::gated;

pub fn router() -> Router {
    gated(
        codes::CREATE_USER,
        Router::new().route("/post_user/", post(post_user).fallback(method_not_allowed)),
    )
}

/// Echo a submitted user record back to the caller. Nothing is persisted.
pub async fn post_user(
    Extension(principal): Extension<AuthenticatedPrincipal>,
    JsonBody(body): JsonBody<PostUserRequest>,
) -> Result<Response, ApiError> {
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": { "user": body.user },
            "created_by": principal.username(),
        })),
    )
        .into_response())
}
