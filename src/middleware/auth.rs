use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{policy::ADMIN_ROLE, validate_jwt, AuthError, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub role: String,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
            email: claims.email,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// Missing credentials are a 401; a token that fails verification is a 403.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejecting request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = validate_jwt(&token, &state.config.security).map_err(|err| {
        if let AuthError::InvalidToken(reason) = &err {
            tracing::warn!("Rejecting token for {}: {}", request.uri().path(), reason);
        }
        ApiError::from(err)
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated user {} ({})", auth_user.id, auth_user.role);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing token")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Missing token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
