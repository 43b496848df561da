//! Cookie-based JWT auth for task endpoints.
//!
//! - `POST /login` sets an HTTP-only `token` cookie containing a JWT
//! - Protected routes run through [`require_auth`], which resolves the
//!   cookie to an [`AuthUser`] extension
//!
//! Every failure mode (missing cookie, malformed token, bad signature,
//! expired claims) yields the same 401 so callers cannot probe which
//! check failed.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use super::routes::AppState;
use crate::config::Config;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Subject (the user's id)
    sub: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
}

/// Authenticated caller identity, inserted by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Issue a signed session token for `user_id`.
pub fn issue_token(user_id: Uuid, secret: &str, ttl_hours: i64) -> anyhow::Result<(String, i64)> {
    let now = Utc::now();
    let exp = now + Duration::hours(ttl_hours.max(1));
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims.exp))
}

fn verify_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Pull the session token out of the `Cookie` header, if present.
fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == TOKEN_COOKIE && !value.is_empty()).then_some(value)
    })
}

/// Build the Set-Cookie value carrying a fresh session token.
pub fn auth_cookie(token: &str, ttl_hours: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        TOKEN_COOKIE,
        token,
        ttl_hours.max(1) * 3600
    )
}

/// Resolve request headers to an authenticated user.
///
/// Returns None for every failure mode without distinguishing them.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Option<AuthUser> {
    let token = token_from_headers(headers)?;
    let claims = verify_token(token, &config.jwt_secret).ok()?;
    let id = Uuid::parse_str(&claims.sub).ok()?;
    Some(AuthUser { id })
}

/// Middleware guarding the task endpoints.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(req.headers(), &state.config) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => (StatusCode::UNAUTHORIZED, "Authentication required").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreKind;
    use axum::http::HeaderValue;
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config::new(
            StoreKind::Memory,
            PathBuf::from("/tmp"),
            "test-secret".to_string(),
        )
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let (token, exp) = issue_token(user_id, "test-secret", 1).unwrap();
        assert!(exp > Utc::now().timestamp());

        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = issue_token(Uuid::new_v4(), "test-secret", 1).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Encode claims expired well past the default leeway.
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(verify_token(&token, "test-secret").is_err());
    }

    #[test]
    fn test_token_extracted_from_cookie_header() {
        let headers = headers_with_cookie("theme=dark; token=abc123; lang=en");
        assert_eq!(token_from_headers(&headers), Some("abc123"));

        let headers = headers_with_cookie("token=abc123");
        assert_eq!(token_from_headers(&headers), Some("abc123"));

        let headers = headers_with_cookie("theme=dark");
        assert_eq!(token_from_headers(&headers), None);

        let headers = headers_with_cookie("token=");
        assert_eq!(token_from_headers(&headers), None);

        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("abc", 1);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_authenticate_uniform_failure() {
        let config = test_config();

        // No cookie header at all.
        assert!(authenticate(&HeaderMap::new(), &config).is_none());

        // Garbage token.
        let headers = headers_with_cookie("token=not-a-jwt");
        assert!(authenticate(&headers, &config).is_none());

        // Valid token signed with a different secret.
        let (token, _) = issue_token(Uuid::new_v4(), "other-secret", 1).unwrap();
        let headers = headers_with_cookie(&format!("token={}", token));
        assert!(authenticate(&headers, &config).is_none());
    }

    #[test]
    fn test_authenticate_accepts_valid_cookie() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let (token, _) = issue_token(user_id, &config.jwt_secret, 1).unwrap();

        let headers = headers_with_cookie(&format!("token={}", token));
        let user = authenticate(&headers, &config).unwrap();
        assert_eq!(user.id, user_id);
    }
}
