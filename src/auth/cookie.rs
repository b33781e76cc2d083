use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use super::IssuedToken;

pub const COOKIE_NAME: &str = "token";

/// HTTP-only session cookie carrying the signed token
pub fn auth_cookie(issued: &IssuedToken, secure: bool) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(issued.expires_at.timestamp())
        .unwrap_or_else(|_| OffsetDateTime::now_utc());

    Cookie::build((COOKIE_NAME, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(expires)
        .build()
}

/// Expired, empty cookie that makes the browser drop the session
pub fn clear_auth_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

pub fn token_from_jar(jar: &CookieJar) -> Option<&str> {
    jar.get(COOKIE_NAME)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
