// handlers/public/products.rs - GET /products handler

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Product;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /products - Entire catalog, unpaginated
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.products.select_all().await?;
    Ok(ApiResponse::success(products))
}
