// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth via middleware::jwt_auth_middleware)
pub mod public;    // Tier 1: No authentication required
pub mod protected; // Tier 2: Bearer token required
