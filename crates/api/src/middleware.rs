use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors::{auth_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::UserContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Require a valid bearer access token and attach the caller's [`UserContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(|msg| {
        json_error(StatusCode::UNAUTHORIZED, "missing_token", msg)
    })?;

    let claims = state
        .services
        .authority
        .verify_access_token(token)
        .map_err(auth_error_to_response)?;

    req.extensions_mut().insert(UserContext::from_claims(claims));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing authorization header")?;

    let header = header
        .to_str()
        .map_err(|_| "invalid authorization header")?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or("invalid authorization format")?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("invalid authorization format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("invalid authorization format");
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(&headers("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(&headers("bearer  abc ")), Ok("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&headers("Basic abc")).is_err());
        assert!(extract_bearer(&headers("Bearer")).is_err());
        assert!(extract_bearer(&headers("Bearer   ")).is_err());
    }
}
