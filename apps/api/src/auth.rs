//! Bearer-token authentication.
//!
//! Tokens are issued by the login service and verified here with the shared
//! HMAC secret. The verified `user_id` becomes the request's [`Principal`];
//! handlers never read an owner from the request body.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username or email)
    pub sub: String,

    /// Owning user; every read and write is scoped to it
    pub user_id: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// The authenticated actor of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub owner_id: i64,
}

/// Verifies HS256 bearer tokens.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        JwtVerifier {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Validate and decode a token.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::unauthorized("Invalid token")
        })?;

        if data.claims.user_id <= 0 {
            return Err(ApiError::unauthorized("Token carries no user"));
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

/// Middleware: attaches a [`Principal`] or answers 401.
pub async fn require_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;
    let claims = state.jwt.verify(token)?;

    req.extensions_mut().insert(Principal {
        owner_id: claims.user_id,
    });

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authorization header is required"))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token format"))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(user_id: i64, expires_in: Duration, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "owner@example.com".to_string(),
            user_id,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_verify_roundtrip() {
        let verifier = JwtVerifier::new(SECRET);
        let claims = verifier.verify(&token(42, Duration::hours(1), SECRET)).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "owner@example.com");
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let verifier = JwtVerifier::new(SECRET);
        assert!(verifier.verify(&token(42, Duration::hours(1), "other")).is_err());
        assert!(verifier.verify(&token(42, Duration::hours(-2), SECRET)).is_err());
        assert!(verifier.verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_rejects_missing_user() {
        let verifier = JwtVerifier::new(SECRET);
        let err = verifier.verify(&token(0, Duration::hours(1), SECRET)).unwrap_err();
        assert_eq!(err.code, "UNAUTHORIZED");
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def");
    }
}
