//! JWT authentication middleware.
//!
//! Tokens are accepted from the `Authorization: Bearer` header or from the
//! HTTP-only `token` cookie set at login. The claim subject is parsed into
//! the active backend's canonical id form at the request boundary, so
//! handlers never see raw id strings.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation};
use std::sync::Arc;

use crate::auth::Claims;
use crate::web::error::ApiError;
use crate::{Id, IdKind};

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Application state for JWT verification.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
    /// Canonical id form of the active backend.
    pub id_kind: IdKind,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str, id_kind: IdKind) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
            id_kind,
        }
    }
}

/// The authenticated user as seen by handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User id in the active backend's canonical form.
    pub id: Id,
    /// Username from the token claims.
    pub username: String,
}

/// Extractor requiring authentication.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Bearer header first, then the session cookie.
            let header_token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .map(str::to_string);

            let token = match header_token {
                Some(t) => t,
                None => CookieJar::from_headers(&parts.headers)
                    .get(TOKEN_COOKIE)
                    .map(|c| c.value().to_string())
                    .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?,
            };

            // Set by the jwt_auth middleware.
            let jwt_state = parts
                .extensions
                .get::<Arc<JwtState>>()
                .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

            let token_data =
                decode::<Claims>(&token, &jwt_state.decoding_key, &jwt_state.validation).map_err(
                    |e| {
                        tracing::debug!("JWT validation failed: {}", e);
                        ApiError::unauthorized("Invalid or expired token")
                    },
                )?;

            let id = Id::parse(&token_data.claims.sub, jwt_state.id_kind)
                .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

            Ok(AuthUser(CurrentUser {
                id,
                username: token_data.claims.username,
            }))
        })
    }
}

/// Middleware function injecting JWT state into request extensions.
pub async fn jwt_auth(jwt_state: Arc<JwtState>, mut request: Request<Body>, next: Next) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use crate::config::AuthConfig;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_jwt_state_new() {
        let state = JwtState::new("test-secret", IdKind::Int);
        assert!(state.validation.validate_exp);
        assert_eq!(state.id_kind, IdKind::Int);
    }

    #[test]
    fn test_issued_token_decodes_with_state() {
        let state = JwtState::new("test-secret", IdKind::Int);
        let token = issue_token(&Id::Int(7), "ada", &config("test-secret")).unwrap();
        let decoded = decode::<Claims>(&token, &state.decoding_key, &state.validation).unwrap();
        assert_eq!(decoded.claims.sub, "7");
        assert_eq!(decoded.claims.username, "ada");
    }

    #[test]
    fn test_wrong_secret_fails_decode() {
        let state = JwtState::new("other-secret", IdKind::Int);
        let token = issue_token(&Id::Int(7), "ada", &config("test-secret")).unwrap();
        assert!(decode::<Claims>(&token, &state.decoding_key, &state.validation).is_err());
    }
}
