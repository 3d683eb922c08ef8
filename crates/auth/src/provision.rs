//! Provisioning: creating principals (with credentials) and roles.
//!
//! Unknown role ids and unknown permission codes are dropped silently rather
//! than rejected; callers rely on that leniency.

use thiserror::Error;

use keygate_core::{PrincipalId, RoleId};

use crate::{
    ApiKey, Identity, IdentityStore, Permission, PermissionCode, Principal, Role, StoreError,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for [`Provisioner::create_principal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    pub username: String,
    pub email: Option<String>,
    pub role_id: Option<RoleId>,
}

/// Input for [`Provisioner::create_role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

/// A freshly created principal. `api_key` is the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct ProvisionedPrincipal {
    pub principal: Principal,
    pub api_key: ApiKey,
    pub role: Option<Role>,
}

/// A freshly created role with the permissions that were actually attached.
#[derive(Debug, Clone)]
pub struct ProvisionedRole {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

pub struct Provisioner<S> {
    store: S,
}

impl<S> Provisioner<S>
where
    S: IdentityStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an active principal with a newly generated credential.
    pub fn create_principal(&self, input: NewPrincipal) -> Result<ProvisionedPrincipal, ProvisionError> {
        if input.username.is_empty() {
            return Err(ProvisionError::Validation("Username required".to_string()));
        }

        let role = match input.role_id {
            Some(role_id) => self.store.role(role_id)?,
            None => None,
        };
        if input.role_id.is_some() && role.is_none() {
            tracing::debug!(role_id = ?input.role_id, "unknown role id ignored");
        }

        let api_key = ApiKey::generate();
        let principal = Principal::new(
            Identity {
                username: input.username,
                email: input.email,
            },
            role.as_ref().map(|r| r.id),
            api_key.digest(),
        );
        self.store.insert_principal(principal.clone())?;

        tracing::info!(
            principal_id = %principal.id,
            username = %principal.identity.username,
            role = role.as_ref().map(|r| r.name.as_str()),
            "principal provisioned"
        );

        Ok(ProvisionedPrincipal {
            principal,
            api_key,
            role,
        })
    }

    /// Create a role and attach every known permission code.
    pub fn create_role(&self, input: NewRole) -> Result<ProvisionedRole, ProvisionError> {
        if input.name.is_empty() {
            return Err(ProvisionError::Validation("Role name required".to_string()));
        }

        // Grants are resolved before the role is stored; a failed lookup leaves nothing behind.
        let mut role = Role::new(input.name, input.description);
        let mut permissions: Vec<Permission> = Vec::new();
        for code in input.permissions {
            let code = PermissionCode::new(code);
            if role.grants(&code) {
                continue;
            }
            match self.store.permission_by_code(&code)? {
                Some(permission) => {
                    role.grant(code);
                    permissions.push(permission);
                }
                None => tracing::debug!(code = %code, "unknown permission code ignored"),
            }
        }

        self.store.insert_role(role.clone())?;

        tracing::info!(
            role_id = %role.id,
            name = %role.name,
            permissions = role.len(),
            "role provisioned"
        );

        Ok(ProvisionedRole { role, permissions })
    }

    /// Stop honoring the principal's credential without deleting it.
    pub fn suspend(&self, id: PrincipalId) -> Result<Principal, ProvisionError> {
        let principal = self.store.set_active(id, false)?;
        tracing::info!(principal_id = %id, "principal suspended");
        Ok(principal)
    }

    pub fn activate(&self, id: PrincipalId) -> Result<Principal, ProvisionError> {
        let principal = self.store.set_active(id, true)?;
        tracing::info!(principal_id = %id, "principal activated");
        Ok(principal)
    }

    /// Change (or clear) a principal's role. The role must exist.
    pub fn assign_role(
        &self,
        id: PrincipalId,
        role_id: Option<RoleId>,
    ) -> Result<(Principal, Option<Role>), ProvisionError> {
        let principal = self.store.assign_role(id, role_id)?;
        let role = match principal.role_id {
            Some(role_id) => self.store.role(role_id)?,
            None => None,
        };
        tracing::info!(
            principal_id = %id,
            role = role.as_ref().map(|r| r.name.as_str()),
            "role assigned"
        );
        Ok((principal, role))
    }
}
