use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub mod password;
pub mod policy;

pub use password::{hash_password, verify_password};
pub use policy::{authorize, Action};

/// Identity carried inside every issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        id: i64,
        role: impl Into<String>,
        email: impl Into<String>,
        expiry_hours: u64,
    ) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenGeneration(format!("token expiry of {} hours is out of range", expiry_hours))
            })?;

        Ok(Self {
            id,
            role: role.into(),
            email: email.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Sign claims with the configured shared secret (HS256)
pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Build and sign a token for the given identity using configured expiry
pub fn issue_token(
    id: i64,
    role: &str,
    email: &str,
    security: &SecurityConfig,
) -> Result<String, AuthError> {
    let claims = Claims::new(id, role, email, security.jwt_expiry_hours)?;
    generate_jwt(&claims, security)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let security = security();
        let token = issue_token(42, "admin", "a@example.com", &security).unwrap();
        let claims = validate_jwt(&token, &security).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let security = security();
        let mut other = security.clone();
        other.jwt_secret = "a-different-secret".to_string();

        let token = issue_token(1, "user", "u@example.com", &other).unwrap();
        assert!(matches!(validate_jwt(&token, &security), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = security();
        let mut claims = Claims::new(1, "user", "u@example.com", 1).unwrap();
        claims.iat -= 3 * 3600;
        claims.exp = claims.iat + 3600;

        let token = generate_jwt(&claims, &security).unwrap();
        assert!(validate_jwt(&token, &security).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            validate_jwt("not.a.jwt", &security()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn absurd_expiry_is_an_error() {
        let mut security = security();
        security.jwt_expiry_hours = u64::MAX;
        assert!(matches!(
            issue_token(1, "user", "u@example.com", &security),
            Err(AuthError::TokenGeneration(_))
        ));

        security.jwt_expiry_hours = i64::MAX as u64;
        assert!(issue_token(1, "user", "u@example.com", &security).is_err());
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut security = security();
        security.jwt_secret.clear();
        assert!(matches!(
            issue_token(1, "user", "u@example.com", &security),
            Err(AuthError::MissingSecret)
        ));
    }
}
