pub mod order;
pub mod product;
pub mod user;

pub use order::{CartItem, Order};
pub use product::{NewProduct, Product, ProductError};
pub use user::{PublicUser, User};
