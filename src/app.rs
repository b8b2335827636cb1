use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::{Order, Product, User};
use crate::database::{IdGenerator, Repository, Storage};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Everything a handler needs, injected through axum state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn Storage>,
    pub users: Arc<Repository<User>>,
    pub products: Arc<Repository<Product>>,
    pub orders: Arc<Repository<Order>>,
    pub ids: Arc<IdGenerator>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(Repository::new(storage.clone())),
            products: Arc::new(Repository::new(storage.clone())),
            orders: Arc::new(Repository::new(storage.clone())),
            storage,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    /// Make sure fresh ids sort after everything already persisted
    pub async fn seed_ids(&self) -> Result<(), crate::database::StoreError> {
        use crate::database::Record;

        let users = self.users.select_all().await?;
        let products = self.products.select_all().await?;
        let orders = self.orders.select_all().await?;

        let max = users
            .iter()
            .map(Record::id)
            .chain(products.iter().map(Record::id))
            .chain(orders.iter().map(Record::id))
            .max();
        if let Some(max) = max {
            self.ids.observe(max);
        }
        Ok(())
    }
}

pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(public_routes(state.clone()))
        // Protected API
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .with_state(state);

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes(state: AppState) -> Router<AppState> {
    let require_auth = from_fn_with_state(state, jwt_auth_middleware);

    Router::new()
        .route("/register", post(public::auth::register))
        .route("/login", post(public::auth::login))
        // Listing is public, creating needs a token
        .route(
            "/products",
            get(public::products::list).merge(post(protected::products::create).route_layer(require_auth)),
        )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{orders, products, users};

    Router::new()
        .route("/products/by-user/:user_id", get(products::by_user))
        .route("/products/requested-deletion", get(products::requested_deletion))
        .route("/products/:id", axum::routing::put(products::update).delete(products::delete))
        .route("/products/:id/request-delete", post(products::request_delete))
        .route("/users", get(users::list))
        .route("/cart/checkout", post(orders::checkout))
        .route("/orders/:user_id", get(orders::list_by_user))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Market API",
        "version": version,
        "endpoints": {
            "products": "/products[/:id] (list public, changes need a token)",
            "accounts": "/register, /login (public), /users (token)",
            "orders": "/cart/checkout, /orders/:userId (token)",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.storage.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "storage": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "storage unavailable"
                })),
            )
        }
    }
}
