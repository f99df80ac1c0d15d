use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from password hashing and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad signature, malformed payload, or expiry in the past.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("credential processing failed: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and validates HS256 bearer tokens and handles password hashing.
///
/// A token encodes the subject id and an expiry `ttl_secs` in the future
/// (default 30 days, from settings). Whether the subject still exists is the
/// caller's concern; see `Accounts::authenticate`.
pub struct AuthService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl AuthService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// A hash that fails to parse counts as a mismatch, not an error.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + Duration::seconds(self.ttl_secs as i64)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Decode and verify a token, returning the subject id.
    pub fn decode_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims.sub)
    }
}
