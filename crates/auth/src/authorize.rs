use thiserror::Error;

use crate::{AuthenticatedPrincipal, PermissionCode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The gate was reached without a resolved principal.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied. Required: {0}")]
    Forbidden(PermissionCode),
}

/// Authorize an authenticated principal for a single permission code.
///
/// - No store access
/// - No panics
/// - Allow iff the principal has a role and the role's code set contains `required`
///
/// Every denial is logged here, so callers only map the error.
pub fn authorize(principal: &AuthenticatedPrincipal, required: &PermissionCode) -> Result<(), AuthzError> {
    if principal.has_permission(required) {
        return Ok(());
    }

    tracing::info!(
        principal_id = %principal.principal_id(),
        required = %required,
        "permission denied"
    );
    Err(AuthzError::Forbidden(required.clone()))
}

/// Authorize whatever principal the request carries, failing closed when
/// there is none.
pub fn authorize_request(
    principal: Option<&AuthenticatedPrincipal>,
    required: &PermissionCode,
) -> Result<(), AuthzError> {
    let principal = principal.ok_or(AuthzError::Unauthenticated)?;
    authorize(principal, required)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{Identity, Principal, Role, codes};

    fn principal_with(role: Option<Role>) -> AuthenticatedPrincipal {
        let principal = Principal::without_credential(
            Identity {
                username: "tester".to_string(),
                email: None,
            },
            role.as_ref().map(|r| r.id),
        );
        AuthenticatedPrincipal::new(principal, role)
    }

    fn role_with(codes: &[&str]) -> Role {
        let mut role = Role::new("Role", "");
        for code in codes {
            role.grant(PermissionCode::new(code.to_string()));
        }
        role
    }

    #[test]
    fn user_role_cannot_create_products() {
        let principal = principal_with(Some(role_with(&["view_products"])));

        assert_eq!(authorize(&principal, &codes::VIEW_PRODUCTS), Ok(()));
        let err = authorize(&principal, &codes::CREATE_PRODUCTS).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden(codes::CREATE_PRODUCTS));
        assert!(err.to_string().contains("create_products"));
    }

    #[test]
    fn empty_role_denies() {
        let principal = principal_with(Some(Role::new("Empty", "")));
        assert!(authorize(&principal, &codes::VIEW_PRODUCTS).is_err());
    }

    #[test]
    fn missing_principal_fails_closed() {
        assert_eq!(
            authorize_request(None, &codes::VIEW_PRODUCTS),
            Err(AuthzError::Unauthenticated)
        );
    }

    #[test]
    fn code_equality_is_exact() {
        let principal = principal_with(Some(role_with(&["view_products"])));
        assert!(authorize(&principal, &PermissionCode::new("VIEW_PRODUCTS")).is_err());
        assert!(authorize(&principal, &PermissionCode::new("view_products ")).is_err());
    }

    proptest! {
        #[test]
        fn allow_iff_role_contains_code(
            granted in proptest::collection::hash_set("[a-z_]{1,12}", 0..8),
            required in "[a-z_]{1,12}",
        ) {
            let codes: Vec<&str> = granted.iter().map(String::as_str).collect();
            let principal = principal_with(Some(role_with(&codes)));
            let required = PermissionCode::new(required);

            let allowed = authorize(&principal, &required).is_ok();
            prop_assert_eq!(allowed, granted.contains(required.as_str()));
        }

        #[test]
        fn no_role_denies_every_code(required in "[a-z_]{1,12}") {
            let principal = principal_with(None);
            let result = authorize(&principal, &PermissionCode::new(required.clone()));
            prop_assert_eq!(result, Err(AuthzError::Forbidden(PermissionCode::new(required))));
        }
    }
}
