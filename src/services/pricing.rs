use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::database::models::{CartItem, Product};

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Product {0} has an unusable price or discount")]
    InvalidPrice(i64),

    #[error("Cart total is too large")]
    Overflow,
}

/// Cart total at current catalog prices.
///
/// Sums `price * (1 - discount / 100) * quantity` in decimal arithmetic and
/// rounds the sum to cents, half away from zero.
pub fn calculate_total(items: &[CartItem], products: &[Product]) -> Result<f64, PricingError> {
    let mut total = Decimal::ZERO;

    for item in items {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or(PricingError::ProductNotFound(item.product_id))?;

        let invalid = || PricingError::InvalidPrice(product.id);
        let price = Decimal::from_f64(product.price).ok_or_else(invalid)?;
        let discount = Decimal::from_f64(product.discount).ok_or_else(invalid)?;

        let line = discount
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|off| Decimal::ONE.checked_sub(off))
            .and_then(|factor| price.checked_mul(factor))
            .and_then(|unit| unit.checked_mul(Decimal::from(item.quantity.max(1))))
            .ok_or(PricingError::Overflow)?;
        total = total.checked_add(line).ok_or(PricingError::Overflow)?;
    }

    total
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .ok_or(PricingError::InvalidPrice(0))
}
