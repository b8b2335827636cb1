// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware, which injects an
// `AuthUser` extension. Handlers then consult `auth::authorize` for the
// action they perform.

pub mod orders;   // Checkout and order history
pub mod products; // Catalog changes and moderation flags
pub mod users;    // Account listing
