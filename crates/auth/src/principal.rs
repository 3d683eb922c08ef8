use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keygate_core::{PrincipalId, RoleId};

use crate::{CredentialDigest, PermissionCode, Role};

/// Identity fields owned outside the gate (the "user" behind a principal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub email: Option<String>,
}

/// A stored principal.
///
/// `role_id` is a weak reference: it is resolved at read time and an id that
/// no longer resolves reads as "no role".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub identity: Identity,
    pub role_id: Option<RoleId>,
    pub credential: Option<CredentialDigest>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(identity: Identity, role_id: Option<RoleId>, credential: CredentialDigest) -> Self {
        Self::build(identity, role_id, Some(credential))
    }

    /// A principal without API access (no credential).
    pub fn without_credential(identity: Identity, role_id: Option<RoleId>) -> Self {
        Self::build(identity, role_id, None)
    }

    fn build(identity: Identity, role_id: Option<RoleId>, credential: Option<CredentialDigest>) -> Self {
        let now = Utc::now();
        Self {
            id: PrincipalId::new(),
            identity,
            role_id,
            credential,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The principal bound to the current request after credential resolution.
///
/// There is no public constructor: only [`crate::CredentialResolver`] builds
/// one, so holding a value proves authentication already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    principal_id: PrincipalId,
    identity: Identity,
    role: Option<Role>,
}

impl AuthenticatedPrincipal {
    pub(crate) fn new(principal: Principal, role: Option<Role>) -> Self {
        Self {
            principal_id: principal.id,
            identity: principal.identity,
            role,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }

    /// Membership test against the role snapshot. No role never grants.
    pub fn has_permission(&self, code: &PermissionCode) -> bool {
        self.role.as_ref().is_some_and(|role| role.grants(code))
    }
}
