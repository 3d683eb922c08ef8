//! Admin routes for identity management: provisioning principals and roles,
//! and managing a principal's access afterwards.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use keygate_auth::{AuthenticatedPrincipal, NewPrincipal, NewRole, Principal, Role, codes};
use keygate_core::PrincipalId;

use crate::app::dto::{self, AssignRoleRequest, CreateRoleRequest, CreateUserRequest};
use crate::app::errors::ApiError;
use crate::app::extract::JsonBody;
use crate::app::routes::method_not_allowed;
use crate::app::services::AppServices;
use crate::authz::gated;

pub fn router() -> Router {
    let users = Router::new()
        .route("/create_user/", post(create_user).fallback(method_not_allowed))
        .route(
            "/users/:principal_id/suspend",
            post(suspend_user).fallback(method_not_allowed),
        )
        .route(
            "/users/:principal_id/activate",
            post(activate_user).fallback(method_not_allowed),
        )
        .route(
            "/users/:principal_id/role",
            post(assign_role).fallback(method_not_allowed),
        );
    let roles = Router::new().route("/create_role/", post(create_role).fallback(method_not_allowed));

    Router::new()
        .merge(gated(codes::ADMIN_USERS, users))
        .merge(gated(codes::ADMIN_ROLES, roles))
}

/// Provision a principal. The response carries the only copy of its API key.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<AuthenticatedPrincipal>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let provisioned = services.provisioner().create_principal(NewPrincipal {
        username: body.username.unwrap_or_default(),
        email: body.email,
        role_id: dto::lenient_role_id(body.role_id.as_ref()),
    })?;

    tracing::info!(
        actor = %actor.principal_id(),
        principal_id = %provisioned.principal.id,
        "principal created via admin api"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": dto::provisioned_principal_json(&provisioned),
        })),
    )
        .into_response())
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<AuthenticatedPrincipal>,
    JsonBody(body): JsonBody<CreateRoleRequest>,
) -> Result<Response, ApiError> {
    let provisioned = services.provisioner().create_role(NewRole {
        name: body.name.unwrap_or_default(),
        description: body.description.unwrap_or_default(),
        permissions: dto::permission_codes(&body.permissions),
    })?;

    tracing::info!(
        actor = %actor.principal_id(),
        role_id = %provisioned.role.id,
        "role created via admin api"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Role created successfully",
            "role": dto::provisioned_role_json(&provisioned),
        })),
    )
        .into_response())
}

pub async fn suspend_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(principal_id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = services.provisioner().suspend(parse_principal_id(&principal_id)?)?;
    let role = current_role(&services, &principal)?;
    Ok(user_response("User suspended", &principal, role.as_ref()))
}

pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(principal_id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = services.provisioner().activate(parse_principal_id(&principal_id)?)?;
    let role = current_role(&services, &principal)?;
    Ok(user_response("User activated", &principal, role.as_ref()))
}

/// Replace a principal's role; `role_id: null` clears it. Unlike creation,
/// an unknown role is an error here.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(principal_id): Path<String>,
    JsonBody(body): JsonBody<AssignRoleRequest>,
) -> Result<Response, ApiError> {
    let id = parse_principal_id(&principal_id)?;
    let role_id = dto::strict_role_id(body.role_id.as_deref())?;
    let (principal, role) = services.provisioner().assign_role(id, role_id)?;
    Ok(user_response("Role assigned", &principal, role.as_ref()))
}

fn parse_principal_id(raw: &str) -> Result<PrincipalId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("User with id {raw} not found")))
}

fn current_role(services: &AppServices, principal: &Principal) -> Result<Option<Role>, ApiError> {
    match principal.role_id {
        Some(role_id) => Ok(services.identity.role(role_id)?),
        None => Ok(None),
    }
}

fn user_response(message: &str, principal: &Principal, role: Option<&Role>) -> Response {
    Json(json!({
        "message": message,
        "user": {
            "id": principal.id.to_string(),
            "username": principal.identity.username,
            "email": principal.identity.email,
            "active": principal.active,
            "role": role.map(|r| r.name.as_str()),
        },
    }))
    .into_response()
}
