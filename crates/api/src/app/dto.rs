use serde::Deserialize;
use serde_json::{Map, Value, json};

use keygate_auth::{ProvisionedPrincipal, ProvisionedRole};
use keygate_core::RoleId;
use keygate_products::{NewProduct, Price, ProductPatch};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Accepted as any JSON value; see [`lenient_role_id`].
    #[serde(default)]
    pub role_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Entries that are not strings are skipped like unknown codes; see [`permission_codes`].
    #[serde(default)]
    pub permissions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignRoleRequest {
    /// `null` or absent clears the role.
    #[serde(default)]
    pub role_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostUserRequest {
    #[serde(default)]
    pub user: Value,
}

/// Role id as supplied at principal creation: anything that is not a
/// well-formed id string reads as "no role".
pub fn lenient_role_id(raw: Option<&Value>) -> Option<RoleId> {
    raw.and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
}

/// Keep only the string entries of a role's `permissions` list.
pub fn permission_codes(raw: &[Value]) -> Vec<String> {
    raw.iter().filter_map(Value::as_str).map(str::to_string).collect()
}

pub fn strict_role_id(raw: Option<&str>) -> Result<Option<RoleId>, ApiError> {
    raw.map(|s| {
        s.trim()
            .parse()
            .map_err(|_| ApiError::validation(format!("Invalid role id: {s}")))
    })
    .transpose()
}

/// Split a product creation body into per-item inputs.
pub fn product_batch(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(ApiError::validation("Invalid data format")),
    }
}

/// Map one JSON item to creation input. Missing or falsy name/price end up as
/// `None` so validation reports them uniformly.
pub fn new_product(item: &Value) -> Result<NewProduct, String> {
    let Some(obj) = item.as_object() else {
        return Ok(NewProduct::default());
    };

    let name = obj.get("name").and_then(Value::as_str).map(str::to_string);
    let price = match obj.get("price") {
        None | Some(Value::Null) => None,
        Some(v) => Some(serde_json::from_value::<Price>(v.clone()).map_err(|e| e.to_string())?),
    };
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(NewProduct {
        name,
        price,
        description,
    })
}

/// Map an update body to a patch. Only keys present in the body are touched.
pub fn product_patch(body: &Map<String, Value>) -> Result<ProductPatch, ApiError> {
    let name = body
        .get("name")
        .map(|v| v.as_str().unwrap_or_default().to_string());
    let price = match body.get("price") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(v) => Some(Some(
            serde_json::from_value::<Price>(v.clone()).map_err(|e| ApiError::validation(e.to_string()))?,
        )),
    };
    let description = body
        .get("description")
        .map(|v| v.as_str().map(str::to_string));

    Ok(ProductPatch {
        name,
        price,
        description,
    })
}

// -------------------------
// Response mapping
// -------------------------

pub fn provisioned_principal_json(p: &ProvisionedPrincipal) -> Value {
    json!({
        "id": p.principal.id.to_string(),
        "username": p.principal.identity.username,
        "email": p.principal.identity.email,
        "api_key": p.api_key.expose(),
        "role": p.role.as_ref().map(|r| r.name.as_str()),
    })
}

pub fn provisioned_role_json(r: &ProvisionedRole) -> Value {
    json!({
        "id": r.role.id.to_string(),
        "name": r.role.name,
        "description": r.role.description,
        "permissions": r
            .permissions
            .iter()
            .map(|p| json!({ "code": p.code.as_str(), "name": p.name }))
            .collect::<Vec<_>>(),
    })
}
