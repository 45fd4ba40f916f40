use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use cookie::{time::Duration, Cookie, SameSite};

use crate::{error::AppError, models::SessionUser, routes::AppState};

/// Name of the cookie carrying the opaque session identifier
pub const SESSION_COOKIE: &str = "session_id";

/// Reads the session identifier from the request's `Cookie` headers
pub fn session_id_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// `Set-Cookie` value for a fresh session
pub fn session_cookie(session_id: &str, ttl_secs: u64, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl_secs as i64))
        .secure(secure)
        .build()
        .to_string()
}

/// `Set-Cookie` value that makes the browser drop the session cookie
pub fn expired_session_cookie(secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .secure(secure)
        .build()
        .to_string()
}

/// The logged-in caller; rejects with 401 when there is no live session
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: SessionUser,
    pub session_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

        let user = state
            .sessions
            .get(&session_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(Self { user, session_id })
    }
}

/// The caller when logged in, `None` otherwise
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match session_id_from(&parts.headers) {
            Some(session_id) => Ok(Self(state.sessions.get(&session_id).await?)),
            None => Ok(Self(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=abc-123; lang=th"),
        );
        assert_eq!(session_id_from(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_session_id_across_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("session_id=xyz"));
        assert_eq!(session_id_from(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_or_empty_session_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("session_id="));
        assert_eq!(session_id_from(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 3600, true);
        assert!(cookie.starts_with("session_id=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Secure"));

        assert!(!session_cookie("abc", 60, false).contains("Secure"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = expired_session_cookie(false);
        assert!(cookie.starts_with("session_id=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
