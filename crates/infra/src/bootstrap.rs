//! One-time, idempotent seeding that runs outside the enforcement pipeline.
//!
//! The gate protects the endpoints that manage its own data, so the first
//! permissions, roles and administrative principal have to exist before any
//! request can succeed.

use std::sync::Arc;

use keygate_auth::catalog::{self, ADMIN_ROLE, RoleGrants};
use keygate_auth::{
    IdentityStore, NewPrincipal, Permission, PermissionCode, ProvisionError, ProvisionedPrincipal,
    Provisioner, Role, StoreError,
};
use keygate_products::{NewProduct, Price};

use crate::config::AppConfig;
use crate::store::{ProductStore, ProductStoreError};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Products(#[from] ProductStoreError),
    #[error("role '{0}' is missing after seeding")]
    MissingRole(&'static str),
}

/// What a bootstrap run changed.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    /// Present only when the administrative principal was created by this run.
    pub admin: Option<ProvisionedPrincipal>,
    pub products_created: usize,
}

/// Seed permissions, default roles, the admin principal and (optionally) the
/// demo catalog. Re-running is a no-op for anything that already exists.
pub fn bootstrap(
    identity: Arc<dyn IdentityStore>,
    products: Arc<dyn ProductStore>,
    config: &AppConfig,
) -> Result<BootstrapReport, BootstrapError> {
    let permissions_created = seed_permissions(identity.as_ref())?;
    let roles_created = seed_roles(identity.as_ref())?;
    let admin = seed_admin(identity, &config.admin_username)?;
    let products_created = if config.seed_products {
        seed_products(products.as_ref())?
    } else {
        0
    };

    tracing::info!(
        permissions_created,
        roles_created,
        admin_created = admin.is_some(),
        products_created,
        "bootstrap complete"
    );

    Ok(BootstrapReport {
        permissions_created,
        roles_created,
        admin,
        products_created,
    })
}

/// Get-or-create every default permission by code.
pub fn seed_permissions(store: &dyn IdentityStore) -> Result<usize, StoreError> {
    let mut created = 0;
    for def in catalog::default_permissions() {
        if store.permission_by_code(&def.code)?.is_some() {
            continue;
        }
        store.insert_permission(Permission::new(def.code, def.name, def.description))?;
        created += 1;
    }
    Ok(created)
}

/// Create missing default roles. Grants are applied only to newly created roles.
pub fn seed_roles(store: &dyn IdentityStore) -> Result<usize, StoreError> {
    let mut created = 0;
    for def in catalog::default_roles() {
        if store.role_by_name(def.name)?.is_some() {
            continue;
        }

        let known: Vec<PermissionCode> =
            store.list_permissions()?.into_iter().map(|p| p.code).collect();
        let grants = match def.grants {
            RoleGrants::All => known,
            RoleGrants::Only(codes) => codes.into_iter().filter(|c| known.contains(c)).collect(),
        };

        let mut role = Role::new(def.name, def.description);
        for code in grants {
            role.grant(code);
        }
        store.insert_role(role)?;
        created += 1;
    }
    Ok(created)
}

/// Create the administrative principal unless one with this username exists.
pub fn seed_admin(
    store: Arc<dyn IdentityStore>,
    username: &str,
) -> Result<Option<ProvisionedPrincipal>, BootstrapError> {
    if store.principal_by_username(username)?.is_some() {
        tracing::debug!(username, "admin principal already present");
        return Ok(None);
    }

    let admin_role = store
        .role_by_name(ADMIN_ROLE)?
        .ok_or(BootstrapError::MissingRole(ADMIN_ROLE))?;

    let provisioned = Provisioner::new(store).create_principal(NewPrincipal {
        username: username.to_string(),
        email: None,
        role_id: Some(admin_role.id),
    })?;

    // The only place a plaintext credential is ever logged.
    tracing::warn!(
        username,
        api_key = provisioned.api_key.expose(),
        "bootstrap admin created; this key will not be shown again"
    );
    Ok(Some(provisioned))
}

const DEMO_PRODUCTS: &[(&str, i64, &str)] = &[
    ("iPhone 15 Pro", 119_999, "Latest Apple smartphone with titanium design"),
    ("Samsung Galaxy S24", 99_999, "Android flagship with AI features"),
    ("MacBook Pro M3", 199_999, "Professional laptop with M3 chip"),
    ("Sony WH-1000XM5", 39_999, "Premium noise-canceling headphones"),
    ("iPad Pro 12.9", 109_999, "Professional tablet with M2 chip"),
    ("Nintendo Switch OLED", 34_999, "Gaming console with OLED screen"),
    ("AirPods Pro 2", 24_999, "Wireless earbuds with spatial audio"),
    ("Tesla Model Y", 5_299_999, "Electric SUV with autopilot"),
    ("PlayStation 5", 49_999, "Next-gen gaming console"),
    ("Dell XPS 13", 129_999, "Premium ultrabook laptop"),
    ("Google Pixel 8", 69_999, "Google smartphone with AI photography"),
    ("Microsoft Surface Pro 9", 99_999, "2-in-1 tablet and laptop"),
    ("Dyson V15 Detect", 74_999, "Cordless vacuum with laser dust detection"),
    ("Apple Watch Ultra 2", 79_999, "Premium smartwatch for athletes"),
    ("Bose QuietComfort 45", 32_999, "Wireless noise-canceling headphones"),
];

/// Insert the demo catalog, skipping names already present.
pub fn seed_products(store: &dyn ProductStore) -> Result<usize, ProductStoreError> {
    let mut created = 0;
    for (name, cents, description) in DEMO_PRODUCTS {
        if store.exists_by_name(name)? {
            continue;
        }
        let product = NewProduct {
            name: Some(name.to_string()),
            price: Some(Price::from_cents(*cents)),
            description: Some(description.to_string()),
        }
        .into_product()
        .map_err(|e| ProductStoreError::Storage(e.to_string()))?;
        store.insert(product)?;
        created += 1;
    }
    Ok(created)
}
