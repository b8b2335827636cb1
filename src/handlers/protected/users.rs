// handlers/protected/users.rs - GET /users handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::{authorize, Action};
use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /users - Every registered account, without password hashes
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<PublicUser>> {
    authorize(&user, Action::ListUsers, None)?;

    let users = state.users.select_all().await?;
    Ok(ApiResponse::success(users.into_iter().map(PublicUser::from).collect()))
}
