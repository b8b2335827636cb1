// handlers/public/auth/register.rs - POST /register handler

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::app::AppState;
use crate::auth::{hash_password, issue_token};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub token: String,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// POST /register - Create an account and log it in
///
/// Expected Input:
/// ```json
/// { "username": "ann", "email": "ann@example.com", "password": "...", "role": "user" }
/// ```
///
/// Responds 201 with `{ "message": "User registered.", "token": "<jwt>" }`.
/// Any missing field is a 400; a taken email is a 409.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let (Some(username), Some(email), Some(password), Some(role)) = (
        present(payload.username),
        present(payload.email),
        present(payload.password),
        present(payload.role),
    ) else {
        return Err(ApiError::bad_request("All fields are required."));
    };

    // Skip the bcrypt work for an email we already know is taken
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered."));
    }

    let security = &state.config.security;
    let user = User {
        id: state.ids.next_id(),
        username,
        email,
        password: hash_password(password, security.bcrypt_cost).await?,
        role,
        extra: Map::new(),
    };

    if !state.users.insert_unique_email(user.clone()).await? {
        return Err(ApiError::conflict("Email already registered."));
    }

    let token = issue_token(user.id, &user.role, &user.email, security)?;
    tracing::info!("Registered user {} <{}> as '{}'", user.id, user.email, user.role);

    Ok(ApiResponse::created(RegisterResponse {
        message: "User registered.",
        token,
    }))
}
