//! Per-route permission enforcement.
//!
//! Runs inside [`crate::middleware::authenticate`]: the principal it checks
//! is whatever the authentication layer attached to the request.

use axum::{
    Router,
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
};

use keygate_auth::{AuthenticatedPrincipal, PermissionCode, authorize_request};

use crate::app::errors::ApiError;

/// Reject the request unless its principal holds `required`.
pub async fn require_permission(
    State(required): State<PermissionCode>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize_request(req.extensions().get::<AuthenticatedPrincipal>(), &required)?;
    Ok(next.run(req).await)
}

/// Gate every route in `router` behind `required`.
///
/// Applied as a route layer, so unmatched paths still fall through to 404
/// while wrong methods on a matched path are checked first.
pub fn gated(required: PermissionCode, router: Router) -> Router {
    router.route_layer(from_fn_with_state(required, require_permission))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::StatusCode,
        routing::get,
    };
    use tower::ServiceExt;

    use keygate_auth::{
        ApiKey, CredentialResolver, Identity, IdentityStore, InMemoryIdentityStore, Principal, Role,
        codes,
    };

    use super::*;

    fn resolved(granted: &[PermissionCode]) -> AuthenticatedPrincipal {
        let store = InMemoryIdentityStore::arc();
        let mut role = Role::new("tester", "");
        for code in granted {
            role.grant(code.clone());
        }
        let role_id = role.id;
        store.insert_role(role).unwrap();

        let key = ApiKey::generate();
        store
            .insert_principal(Principal::new(
                Identity {
                    username: "tester".to_string(),
                    email: None,
                },
                Some(role_id),
                key.digest(),
            ))
            .unwrap();
        CredentialResolver::new(store).resolve(Some(key.expose())).unwrap()
    }

    fn app() -> Router {
        gated(codes::VIEW_PRODUCTS, Router::new().route("/", get(|| async { "ok" })))
    }

    async fn send(principal: Option<AuthenticatedPrincipal>) -> (StatusCode, String) {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(p) = principal {
            req.extensions_mut().insert(p);
        }
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_principal_fails_closed() {
        let (status, body) = send(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Authentication required"));
    }

    #[tokio::test]
    async fn principal_without_code_is_forbidden() {
        let (status, body) = send(Some(resolved(&[codes::CREATE_PRODUCTS]))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Permission denied. Required: view_products"));
    }

    #[tokio::test]
    async fn principal_with_code_reaches_handler() {
        let (status, body) = send(Some(resolved(&[codes::VIEW_PRODUCTS]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
