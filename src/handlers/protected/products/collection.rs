use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;

use crate::app::AppState;
use crate::auth::{authorize, Action};
use crate::database::models::{NewProduct, Product};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};

/// POST /products - Create a product owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NewProduct>,
) -> ApiResult<Product> {
    authorize(&user, Action::CreateProduct, None)?;

    let product = Product::create(payload, state.ids.next_id(), user.id, Utc::now())?;
    let product = state.products.insert(product).await?;
    tracing::info!("User {} created product {} '{}'", user.id, product.id, product.name);

    Ok(ApiResponse::created(product))
}

/// GET /products/by-user/:user_id - Products created by any given user
pub async fn by_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(creator): Path<String>,
) -> ApiResult<Vec<Product>> {
    authorize(&user, Action::ListProductsByCreator, None)?;

    let products = state.products.select_by_creator(&creator).await?;
    Ok(ApiResponse::success(products))
}

/// GET /products/requested-deletion - Moderation queue of flagged products
pub async fn requested_deletion(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Product>> {
    authorize(&user, Action::ListFlaggedProducts, None)?;

    let products = state.products.select_delete_requested().await?;
    Ok(ApiResponse::success(products))
}
