pub mod pricing;

pub use pricing::{calculate_total, PricingError};
