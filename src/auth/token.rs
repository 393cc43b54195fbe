//! JWT issuance and verification.
//!
//! The subject is the user id rendered as a string so the same claim shape
//! works for both backends' identifier forms; callers parse it back with
//! [`crate::Id::parse`] against the active backend's kind.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::{Id, MmlloError, Result};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id, string-rendered).
    pub sub: String,
    /// Username.
    pub username: String,
    /// Issued-at timestamp (seconds).
    pub iat: u64,
    /// Expiration timestamp (seconds).
    pub exp: u64,
}

/// Issue a signed token for the given user, valid for the configured number
/// of days.
pub fn issue_token(user_id: &Id, username: &str, config: &AuthConfig) -> Result<String> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + config.token_validity_days * 24 * 60 * 60,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| MmlloError::Auth(format!("token encoding failed: {e}")))
}

/// Verify a token's signature and expiry, returning its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| MmlloError::Auth("invalid or expired token".to_string()))
}
