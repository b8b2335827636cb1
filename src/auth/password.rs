//! Password hashing with bcrypt.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool.

use super::AuthError;

/// Hash a plain text password with the given bcrypt cost
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a plain text password against a stored hash.
///
/// A stored value that is not a valid bcrypt hash never matches.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            Ok(false)
        }
    }
}
