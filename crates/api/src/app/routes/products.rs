use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, post, put},
};
use serde_json::{Value, json};

use keygate_auth::{AuthenticatedPrincipal, codes};
use keygate_core::ProductId;

use crate::app::errors::ApiError;
use crate::app::extract::JsonBody;
use crate::app::routes::method_not_allowed;
use crate::app::{dto, services::AppServices};
use crate::authz::gated;

const MAX_PRODUCTS_PER_REQUEST: usize = 3;

pub fn router() -> Router {
    let view = Router::new()
        .route("/get_allproducts/", any(list_products))
        .route("/get_maxprice/", any(max_price));
    let create = Router::new().route(
        "/post_product/",
        post(create_products).fallback(method_not_allowed),
    );
    let update = Router::new().route(
        "/update_product/:product_id/",
        put(update_product).fallback(put_only),
    );

    Router::new()
        .merge(gated(codes::VIEW_PRODUCTS, view))
        .merge(gated(codes::CREATE_PRODUCTS, create))
        .merge(gated(codes::UPDATE_PRODUCTS, update))
}

async fn put_only() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed. Use PUT method.")
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Result<Response, ApiError> {
    let products = services.products.list()?;
    Ok(Json(json!({
        "products": products,
        "accessed_by": principal.username(),
    }))
    .into_response())
}

pub async fn max_price(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Result<Response, ApiError> {
    let product = services
        .products
        .most_expensive()?
        .ok_or_else(|| ApiError::NotFound("No products found".to_string()))?;

    Ok(Json(json!({
        "message": "Most expensive product found",
        "product": product,
        "accessed_by": principal.username(),
    }))
    .into_response())
}

/// Create one product, or a small batch. Items are validated independently;
/// the request succeeds if at least one item was stored.
pub async fn create_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    let items = dto::product_batch(body)?;
    if items.len() > MAX_PRODUCTS_PER_REQUEST {
        return Err(ApiError::validation(format!(
            "Maximum {MAX_PRODUCTS_PER_REQUEST} products allowed per request"
        )));
    }

    let mut created = Vec::with_capacity(items.len());
    let mut errors: Vec<String> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let n = i + 1;
        let product = match dto::new_product(item)
            .and_then(|input| input.into_product().map_err(|e| e.to_string()))
        {
            Ok(product) => product,
            Err(msg) => {
                errors.push(format!("Product {n}: {msg}"));
                continue;
            }
        };
        if let Err(e) = services.products.insert(product.clone()) {
            errors.push(format!("Product {n}: {e}"));
            continue;
        }
        created.push(product);
    }

    if created.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No products were created", "errors": errors })),
        )
            .into_response());
    }

    tracing::info!(
        count = created.len(),
        rejected = errors.len(),
        created_by = principal.username(),
        "products created"
    );

    let mut body = json!({
        "message": format!("{} product(s) created successfully", created.len()),
        "products": created,
        "created_by": principal.username(),
    });
    if !errors.is_empty() {
        body["errors"] = json!(errors);
    }
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    Path(product_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    let Value::Object(fields) = body else {
        return Err(ApiError::validation("Invalid data format"));
    };

    let not_found = || ApiError::NotFound(format!("Product with id {product_id} not found"));
    let id: ProductId = product_id.parse().map_err(|_| not_found())?;
    let mut product = services.products.get(id)?.ok_or_else(not_found)?;

    product.apply(dto::product_patch(&fields)?)?;
    services.products.update(&product)?;

    tracing::info!(product_id = %product.id, updated_by = principal.username(), "product updated");

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": product,
        "updated_by": principal.username(),
    }))
    .into_response())
}
