use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` with rejections reported through `ApiError`, so malformed
/// request bodies get the same `{ "error": ... }` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
