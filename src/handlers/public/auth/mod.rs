// handlers/public/auth/mod.rs - Public authentication handlers
//
// Both endpoints hand back a signed token; registering logs the new user in.

pub mod login;    // POST /login - verify password and get JWT
pub mod register; // POST /register - create account and get JWT

pub use login::login;
pub use register::register;
