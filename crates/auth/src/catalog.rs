//! Default permission and role catalogue seeded at bootstrap.

use crate::{PermissionCode, codes};

/// Name of the role granted every permission.
pub const ADMIN_ROLE: &str = "Admin";

#[derive(Debug, Clone)]
pub struct PermissionDefinition {
    pub code: PermissionCode,
    pub name: &'static str,
    pub description: &'static str,
}

/// Which permissions a default role receives when it is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleGrants {
    /// Every permission known at seeding time.
    All,
    Only(Vec<PermissionCode>),
}

#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub grants: RoleGrants,
}

pub fn default_permissions() -> Vec<PermissionDefinition> {
    vec![
        PermissionDefinition {
            code: codes::VIEW_PRODUCTS,
            name: "View products",
            description: "List and inspect products",
        },
        PermissionDefinition {
            code: codes::CREATE_PRODUCTS,
            name: "Create products",
            description: "Create new products",
        },
        PermissionDefinition {
            code: codes::UPDATE_PRODUCTS,
            name: "Update products",
            description: "Modify existing products",
        },
        PermissionDefinition {
            code: codes::DELETE_PRODUCTS,
            name: "Delete products",
            description: "Delete products",
        },
        PermissionDefinition {
            code: codes::CREATE_USER,
            name: "Create users",
            description: "Submit new user records",
        },
        PermissionDefinition {
            code: codes::ADMIN_USERS,
            name: "Administer users",
            description: "Provision principals and manage their access",
        },
        PermissionDefinition {
            code: codes::ADMIN_ROLES,
            name: "Administer roles",
            description: "Create roles and assign permissions",
        },
    ]
}

pub fn default_roles() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition {
            name: ADMIN_ROLE,
            description: "Administrator with every permission",
            grants: RoleGrants::All,
        },
        RoleDefinition {
            name: "User",
            description: "Standard user with read-only access",
            grants: RoleGrants::Only(vec![codes::VIEW_PRODUCTS]),
        },
        RoleDefinition {
            name: "Manager",
            description: "Manages the product catalog",
            grants: RoleGrants::Only(vec![
                codes::VIEW_PRODUCTS,
                codes::CREATE_PRODUCTS,
                codes::UPDATE_PRODUCTS,
            ]),
        },
    ]
}
