// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus the read-only catalog listing.
//
// Security Level: None (completely public access)
// Middleware: None

pub mod auth;
pub mod products;
