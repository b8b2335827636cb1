// handlers/public/auth/login.rs - POST /login handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{issue_token, verify_password};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login - Authenticate by email and password and receive a JWT
///
/// Unknown email → 400 "Invalid credentials"; wrong password → 401.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = payload.email.unwrap_or_default();

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::warn!("Login attempt for unknown email <{}>", email);
        return Err(ApiError::bad_request("Invalid credentials"));
    };

    let password = payload.password.unwrap_or_default();
    if !verify_password(password, user.password.clone()).await? {
        tracing::warn!("Wrong password for user {} <{}>", user.id, user.email);
        return Err(ApiError::unauthorized("Wrong password"));
    }

    let token = issue_token(user.id, &user.role, &user.email, &state.config.security)?;
    tracing::debug!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse { token }))
}
