//! HTTP API application wiring (axum router + service wiring).
//!
//! - `services.rs`: store handles shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: JSON body extractor

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{any, get},
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        resolver: services.resolver(),
    };

    // Protected routes: every request is authenticated before any
    // per-route permission check or method dispatch.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::authenticate,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/test_json_view/", any(routes::system::test_json_view))
        .merge(protected)
        .fallback(routes::system::not_found)
}
