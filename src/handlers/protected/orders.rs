// handlers/protected/orders.rs - Cart checkout and order history

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::{SubsecRound, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::auth::{authorize, Action};
use crate::database::models::{CartItem, Order};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::services::calculate_total;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order: Order,
}

/// Pull the cart out of a checkout body.
///
/// Anything other than a non-empty `items` array is an empty cart.
fn parse_cart(body: Value) -> Result<Vec<CartItem>, ApiError> {
    let items = match body {
        Value::Object(mut map) => map.remove("items"),
        _ => None,
    };
    let items = match items {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ApiError::bad_request("Cart is empty.")),
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<CartItem>(item)
                .map(CartItem::normalized)
                .map_err(|e| ApiError::bad_request(format!("Invalid cart item: {}", e)))
        })
        .collect()
}

/// POST /cart/checkout - Price the cart against the live catalog and record an order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<CheckoutResponse> {
    authorize(&user, Action::Checkout, None)?;

    let items = parse_cart(body)?;
    let products = state.products.select_all().await?;
    let total = calculate_total(&items, &products)?;

    let order = Order {
        id: state.ids.next_id(),
        user_id: user.id,
        items,
        total,
        timestamp: Utc::now().trunc_subsecs(3),
        extra: Map::new(),
    };
    let order = state.orders.insert(order).await?;
    tracing::info!("User {} placed order {} totalling {:.2}", user.id, order.id, order.total);

    Ok(ApiResponse::created(CheckoutResponse {
        message: "Order placed successfully.",
        order,
    }))
}

/// GET /orders/:user_id - Order history for one user (self or admin)
pub async fn list_by_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<String>,
) -> ApiResult<Vec<Order>> {
    let target: Option<i64> = target.trim().parse().ok();
    authorize(&user, Action::ViewOrders, target)?;

    let orders = match target {
        Some(user_id) => state.orders.select_by_user(user_id).await?,
        None => Vec::new(),
    };
    Ok(ApiResponse::success(orders))
}
