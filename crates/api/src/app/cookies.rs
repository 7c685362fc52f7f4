//! Refresh-token cookie handling.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};

pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attach the refresh token as an HttpOnly, Secure, SameSite=Lax cookie on `/`.
pub fn with_refresh_token(jar: CookieJar, token: String, expires_at: DateTime<Utc>) -> CookieJar {
    let mut cookie = Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/");
    if let Ok(expires) = time::OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie = cookie.expires(expires);
    }
    jar.add(cookie)
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Expire the refresh cookie, whether or not the request carried it.
pub fn without_refresh_token(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookie.make_removal();
    jar.add(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_attributes() {
        let expires_at = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        let jar = with_refresh_token(CookieJar::new(), "tok".to_string(), expires_at);
        let cookie = jar.get(REFRESH_COOKIE).unwrap();

        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(1_900_000_000)
        );
    }

    #[test]
    fn clearing_emits_an_expired_cookie() {
        let jar = without_refresh_token(CookieJar::new());
        let cookie = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(refresh_token(&jar), None);
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE, ""));
        assert_eq!(refresh_token(&jar), None);
    }
}
