pub mod cookie;
pub mod password;
pub mod validation;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cookie::{auth_cookie, clear_auth_cookie, token_from_jar, COOKIE_NAME};
pub use password::{hash_password, verify_password, PasswordError};
pub use validation::{validate_password, validate_registration, validate_username, ValidationError};

/// Claims carried by the session cookie. `client_id` is the username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub client_id: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// `None` when the configured hours do not fit a `Duration`
    ttl: Option<Duration>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: i64::try_from(expiry_hours).ok().and_then(Duration::try_hours),
        }
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let expires_at = self
            .ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| JwtError::TokenGeneration("token expiry out of range".to_string()))?;
        let claims = Claims {
            client_id: username.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims).map(|token| IssuedToken { token, expires_at })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature (HMAC-SHA256 only) and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() {
            return Err(JwtError::InvalidToken("empty token".to_string()));
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        if data.claims.client_id.is_empty() {
            return Err(JwtError::InvalidToken("missing client_id".to_string()));
        }
        Ok(data.claims)
    }
}
