use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;
use serde_json::{Map, Value};

use super::parse_product_id;
use crate::app::AppState;
use crate::auth::{authorize, Action};
use crate::database::models::Product;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, Message};

/// PUT /products/:id - Merge the body over an existing product
///
/// Only the creator or an admin may update. Fields left out of the body keep
/// their current values; `updatedAt` is refreshed.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> ApiResult<Product> {
    let id = parse_product_id(&id)?;

    let updated = state
        .products
        .modify_id(id, |product| {
            authorize(&user, Action::UpdateProduct, Some(product.created_by))?;
            *product = product.merged(patch, Utc::now())?;
            Ok::<_, ApiError>(product.clone())
        })
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!("User {} updated product {}", user.id, updated.id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /products/:id - Remove a product outright (creator or admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_product_id(&id)?;

    state
        .products
        .delete_id_if(id, |product| {
            authorize(&user, Action::DeleteProduct, Some(product.created_by))
        })
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!("User {} deleted product {}", user.id, id);
    Ok(ApiResponse::success(Message::new("Deleted successfully")))
}

/// POST /products/:id/request-delete - Flag a product for moderation
pub async fn request_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_product_id(&id)?;

    state
        .products
        .modify_id(id, |product| {
            authorize(&user, Action::RequestProductDeletion, Some(product.created_by))?;
            product.delete_requested = true;
            Ok::<_, ApiError>(())
        })
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!("User {} requested deletion of product {}", user.id, id);
    Ok(ApiResponse::success(Message::new("Deletion requested")))
}
