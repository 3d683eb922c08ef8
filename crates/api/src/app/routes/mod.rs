use axum::{Router, routing::get};

use crate::app::errors::ApiError;

pub mod admin;
pub mod products;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami).fallback(method_not_allowed))
        .merge(products::router())
        .merge(users::router())
        .nest("/admin", admin::router())
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed")
}
