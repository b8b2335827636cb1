pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::{by_user, create, requested_deletion};
pub use record::{delete, request_delete, update};

use crate::error::ApiError;

/// Path ids that are not integers can never match a product
fn parse_product_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::not_found("Product not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!(parse_product_id("1718000000000").unwrap(), 1718000000000);
        assert_eq!(parse_product_id(" 42 ").unwrap(), 42);
    }

    #[test]
    fn non_numeric_ids_are_not_found() {
        let err = parse_product_id("lamp").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
