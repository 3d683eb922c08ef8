//! Identity store: principals, roles, permissions and their associations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use keygate_core::{PrincipalId, RoleId};

use crate::{CredentialDigest, Permission, PermissionCode, Principal, Role};

/// Identity store abstraction.
///
/// Uniqueness (permission code and name, role name, principal username and
/// credential) is enforced by the implementation at write time, inside the same
/// critical section as the write itself.
pub trait IdentityStore: Send + Sync {
    /// Insert a permission. Fails on a duplicate code or name.
    fn insert_permission(&self, permission: Permission) -> Result<(), StoreError>;

    fn permission_by_code(&self, code: &PermissionCode) -> Result<Option<Permission>, StoreError>;

    /// All permissions in creation order.
    fn list_permissions(&self) -> Result<Vec<Permission>, StoreError>;

    /// Insert a role. Fails on a duplicate name.
    fn insert_role(&self, role: Role) -> Result<(), StoreError>;

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;

    /// Attach a permission to a role.
    ///
    /// Returns `Ok(false)` when no permission with this code exists.
    fn grant_permission(&self, role_id: RoleId, code: &PermissionCode) -> Result<bool, StoreError>;

    /// Insert a principal. Fails on a duplicate username or credential.
    fn insert_principal(&self, principal: Principal) -> Result<(), StoreError>;

    fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    fn principal_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError>;

    fn principal_by_credential(
        &self,
        digest: &CredentialDigest,
    ) -> Result<Option<Principal>, StoreError>;

    /// Toggle whether the principal's credential is honored.
    fn set_active(&self, id: PrincipalId, active: bool) -> Result<Principal, StoreError>;

    /// Replace (or clear) the principal's role reference.
    fn assign_role(&self, id: PrincipalId, role_id: Option<RoleId>) -> Result<Principal, StoreError>;
}

impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    fn insert_permission(&self, permission: Permission) -> Result<(), StoreError> {
        (**self).insert_permission(permission)
    }

    fn permission_by_code(&self, code: &PermissionCode) -> Result<Option<Permission>, StoreError> {
        (**self).permission_by_code(code)
    }

    fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        (**self).list_permissions()
    }

    fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        (**self).insert_role(role)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        (**self).role(id)
    }

    fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        (**self).role_by_name(name)
    }

    fn grant_permission(&self, role_id: RoleId, code: &PermissionCode) -> Result<bool, StoreError> {
        (**self).grant_permission(role_id, code)
    }

    fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        (**self).insert_principal(principal)
    }

    fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        (**self).principal(id)
    }

    fn principal_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        (**self).principal_by_username(username)
    }

    fn principal_by_credential(
        &self,
        digest: &CredentialDigest,
    ) -> Result<Option<Principal>, StoreError> {
        (**self).principal_by_credential(digest)
    }

    fn set_active(&self, id: PrincipalId, active: bool) -> Result<Principal, StoreError> {
        (**self).set_active(id, active)
    }

    fn assign_role(&self, id: PrincipalId, role_id: Option<RoleId>) -> Result<Principal, StoreError> {
        (**self).assign_role(id, role_id)
    }
}

/// Identity store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    fn poisoned() -> Self {
        Self::Storage("identity store lock poisoned".to_string())
    }
}

#[derive(Debug, Default)]
struct Tables {
    permissions: Vec<Permission>,
    roles: HashMap<RoleId, Role>,
    principals: HashMap<PrincipalId, Principal>,
    by_credential: HashMap<CredentialDigest, PrincipalId>,
    by_username: HashMap<String, PrincipalId>,
}

impl Tables {
    fn principal_mut(&mut self, id: PrincipalId) -> Result<&mut Principal, StoreError> {
        self.principals
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("principal {id} not found")))
    }
}

/// In-memory identity store for tests/dev.
///
/// A single lock guards every table, so each write (including its uniqueness
/// checks) is atomic with respect to concurrent writers and readers.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    tables: RwLock<Tables>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn insert_permission(&self, permission: Permission) -> Result<(), StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        if t.permissions.iter().any(|p| p.code == permission.code) {
            return Err(StoreError::Conflict(format!(
                "permission with code '{}' already exists",
                permission.code
            )));
        }
        if t.permissions.iter().any(|p| p.name == permission.name) {
            return Err(StoreError::Conflict(format!(
                "permission with name '{}' already exists",
                permission.name
            )));
        }
        t.permissions.push(permission);
        Ok(())
    }

    fn permission_by_code(&self, code: &PermissionCode) -> Result<Option<Permission>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t.permissions.iter().find(|p| &p.code == code).cloned())
    }

    fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t.permissions.clone())
    }

    fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        if t.roles.values().any(|r| r.name == role.name) {
            return Err(StoreError::Conflict(format!(
                "role with name '{}' already exists",
                role.name
            )));
        }
        t.roles.insert(role.id, role);
        Ok(())
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t.roles.get(&id).cloned())
    }

    fn role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t.roles.values().find(|r| r.name == name).cloned())
    }

    fn grant_permission(&self, role_id: RoleId, code: &PermissionCode) -> Result<bool, StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        if !t.permissions.iter().any(|p| &p.code == code) {
            return Ok(false);
        }
        let role = t
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| StoreError::NotFound(format!("role {role_id} not found")))?;
        role.grant(code.clone());
        Ok(true)
    }

    fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        if t.principals.contains_key(&principal.id) {
            return Err(StoreError::Conflict(format!(
                "principal {} already exists",
                principal.id
            )));
        }
        if t.by_username.contains_key(&principal.identity.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                principal.identity.username
            )));
        }
        if let Some(digest) = principal.credential {
            if t.by_credential.contains_key(&digest) {
                return Err(StoreError::Conflict("credential already in use".to_string()));
            }
            t.by_credential.insert(digest, principal.id);
        }
        t.by_username
            .insert(principal.identity.username.clone(), principal.id);
        t.principals.insert(principal.id, principal);
        Ok(())
    }

    fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t.principals.get(&id).cloned())
    }

    fn principal_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t
            .by_username
            .get(username)
            .and_then(|id| t.principals.get(id))
            .cloned())
    }

    fn principal_by_credential(
        &self,
        digest: &CredentialDigest,
    ) -> Result<Option<Principal>, StoreError> {
        let t = self.tables.read().map_err(|_| StoreError::poisoned())?;
        Ok(t
            .by_credential
            .get(digest)
            .and_then(|id| t.principals.get(id))
            .cloned())
    }

    fn set_active(&self, id: PrincipalId, active: bool) -> Result<Principal, StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        let principal = t.principal_mut(id)?;
        principal.active = active;
        principal.updated_at = Utc::now();
        Ok(principal.clone())
    }

    fn assign_role(&self, id: PrincipalId, role_id: Option<RoleId>) -> Result<Principal, StoreError> {
        let mut t = self.tables.write().map_err(|_| StoreError::poisoned())?;
        if let Some(role_id) = role_id {
            if !t.roles.contains_key(&role_id) {
                return Err(StoreError::NotFound(format!("role {role_id} not found")));
            }
        }
        let principal = t.principal_mut(id)?;
        principal.role_id = role_id;
        principal.updated_at = Utc::now();
        Ok(principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiKey, Identity, codes};

    fn identity(username: &str) -> Identity {
        Identity {
            username: username.to_string(),
            email: None,
        }
    }

    fn store_with_view_products() -> InMemoryIdentityStore {
        let store = InMemoryIdentityStore::new();
        store
            .insert_permission(Permission::new(codes::VIEW_PRODUCTS, "View products", ""))
            .unwrap();
        store
    }

    #[test]
    fn duplicate_permission_code_is_rejected() {
        let store = store_with_view_products();
        let err = store
            .insert_permission(Permission::new(codes::VIEW_PRODUCTS, "Other name", ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn duplicate_role_name_is_rejected() {
        let store = InMemoryIdentityStore::new();
        store.insert_role(Role::new("User", "")).unwrap();
        let err = store.insert_role(Role::new("User", "again")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn grant_unknown_code_is_reported_not_failed() {
        let store = store_with_view_products();
        let role = Role::new("Temp", "");
        let role_id = role.id;
        store.insert_role(role).unwrap();

        assert!(store.grant_permission(role_id, &codes::VIEW_PRODUCTS).unwrap());
        assert!(
            !store
                .grant_permission(role_id, &PermissionCode::new("bogus_code"))
                .unwrap()
        );

        let role = store.role(role_id).unwrap().unwrap();
        assert_eq!(role.len(), 1);
        assert!(role.grants(&codes::VIEW_PRODUCTS));
    }

    #[test]
    fn credential_lookup_uses_digest_index() {
        let store = InMemoryIdentityStore::new();
        let key = ApiKey::generate();
        let principal = Principal::new(identity("alice"), None, key.digest());
        let id = principal.id;
        store.insert_principal(principal).unwrap();

        let found = store
            .principal_by_credential(&CredentialDigest::of(key.expose()))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert!(
            store
                .principal_by_credential(&CredentialDigest::of("abc"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn duplicate_credential_is_rejected_atomically() {
        let store = InMemoryIdentityStore::new();
        let key = ApiKey::generate();
        store
            .insert_principal(Principal::new(identity("alice"), None, key.digest()))
            .unwrap();

        let err = store
            .insert_principal(Principal::new(identity("bob"), None, key.digest()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        // The rejected write left no trace.
        assert!(store.principal_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = InMemoryIdentityStore::new();
        store
            .insert_principal(Principal::new(identity("alice"), None, ApiKey::generate().digest()))
            .unwrap();
        let err = store
            .insert_principal(Principal::new(identity("alice"), None, ApiKey::generate().digest()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn principals_without_credentials_do_not_collide() {
        let store = InMemoryIdentityStore::new();
        store
            .insert_principal(Principal::without_credential(identity("a"), None))
            .unwrap();
        store
            .insert_principal(Principal::without_credential(identity("b"), None))
            .unwrap();
    }

    #[test]
    fn set_active_and_assign_role_update_the_record() {
        let store = InMemoryIdentityStore::new();
        let role = Role::new("User", "");
        let role_id = role.id;
        store.insert_role(role).unwrap();

        let principal = Principal::new(identity("alice"), None, ApiKey::generate().digest());
        let id = principal.id;
        store.insert_principal(principal).unwrap();

        let updated = store.set_active(id, false).unwrap();
        assert!(!updated.active);

        let updated = store.assign_role(id, Some(role_id)).unwrap();
        assert_eq!(updated.role_id, Some(role_id));

        let err = store.assign_role(id, Some(RoleId::new())).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let cleared = store.assign_role(id, None).unwrap();
        assert_eq!(cleared.role_id, None);
    }

    #[test]
    fn unknown_principal_is_not_found() {
        let store = InMemoryIdentityStore::new();
        let err = store.set_active(PrincipalId::new(), true).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
