use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::services::crypto;

/// JWT claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub sub: String,
    /// Expiry (Unix timestamp)
    pub exp: i64,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or malformed token")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("failed to generate token: {0}")]
    Generation(String),
}

/// Manages JWT access tokens and the opaque tokens of the password-recovery
/// flow
pub struct TokenService {
    jwt_secret: String,
    jwt_expiration_minutes: i64,
    reset_token_secret: String,
}

impl TokenService {
    pub fn new(jwt_secret: String, reset_token_secret: String) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_minutes: 15,
            reset_token_secret,
        }
    }

    /// Generate a JWT for the given user id
    pub fn generate_jwt(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let expiration = now + (self.jwt_expiration_minutes * 60);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Validate a JWT and return its claims
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) {
                TokenError::Expired
            } else {
                TokenError::Invalid
            }
        })?;

        Ok(token_data.claims)
    }

    /// Seconds an access token stays valid
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }

    /// Generate a cryptographically secure opaque token (32 random bytes,
    /// base64)
    pub fn generate_opaque_token(&self) -> String {
        let mut rng = rand::rng();
        let random_bytes: [u8; 32] = rng.random();
        general_purpose::STANDARD.encode(random_bytes)
    }

    /// Hash an opaque token for storage; only the hash is persisted.
    pub fn hash_opaque_token(&self, token: &str) -> String {
        crypto::hmac_sha256_token(&self.reset_token_secret, token)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("reset_token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("jwt-test-secret".to_string(), "reset-test-secret".to_string())
    }

    #[test]
    fn test_generated_jwt_round_trips() {
        let tokens = service();

        let jwt = tokens.generate_jwt("user-123").unwrap();
        let claims = tokens.validate_jwt(&jwt).unwrap();

        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, tokens.access_token_ttl_seconds());
    }

    #[test]
    fn test_jwt_from_another_secret_is_rejected() {
        let ours = service();
        let theirs = TokenService::new("other-secret".to_string(), "reset".to_string());

        let jwt = theirs.generate_jwt("user-123").unwrap();
        assert!(matches!(ours.validate_jwt(&jwt), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let tokens = service();
        assert!(matches!(
            tokens.validate_jwt("not-a-jwt"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_opaque_tokens_are_unique_and_hash_deterministically() {
        let tokens = service();

        let a = tokens.generate_opaque_token();
        let b = tokens.generate_opaque_token();
        assert_ne!(a, b);

        assert_eq!(tokens.hash_opaque_token(&a), tokens.hash_opaque_token(&a));
        assert_ne!(tokens.hash_opaque_token(&a), tokens.hash_opaque_token(&b));
        assert_ne!(tokens.hash_opaque_token(&a), a);
    }
}
