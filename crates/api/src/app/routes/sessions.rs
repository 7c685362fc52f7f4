use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use vidstream_core::SessionId;

use crate::app::dto::{self, LoginResponse, MessageResponse, RenewResponse};
use crate::app::services::AppServices;
use crate::app::{cookies, errors};
use crate::context::UserContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let outcome = match services.authority.login(&body.email, &body.password).await {
        Ok(outcome) => outcome,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let response = LoginResponse::from(&outcome);
    let jar = cookies::with_refresh_token(jar, outcome.refresh_token, outcome.refresh_expires_at);
    (StatusCode::OK, jar, Json(response)).into_response()
}

/// Refresh token comes from the cookie, or from a `{"refresh_token": ...}` body
/// for clients without a cookie store.
pub async fn renew(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    body: Bytes,
) -> axum::response::Response {
    let token = match cookies::refresh_token(&jar) {
        Some(token) => token,
        None => match refresh_token_from_body(&body) {
            Ok(Some(token)) => token,
            Ok(None) => {
                return errors::json_error(
                    StatusCode::UNAUTHORIZED,
                    "missing_token",
                    "refresh token required",
                );
            }
            Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
        },
    };

    match services.authority.renew_access_token(&token).await {
        Ok(renewed) => (StatusCode::OK, Json(RenewResponse::from(renewed))).into_response(),
        Err(e) => errors::renew_error_to_response(e),
    }
}

fn refresh_token_from_body(body: &[u8]) -> Result<Option<String>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let req: dto::RenewRequest = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    Ok(req.refresh_token.filter(|t| !t.is_empty()))
}

/// Close the caller's own session and clear the refresh cookie.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    jar: CookieJar,
) -> axum::response::Response {
    match services.authority.logout(user.session_id()).await {
        Ok(()) => (
            StatusCode::OK,
            cookies::without_refresh_token(jar),
            Json(MessageResponse {
                message: "logged out",
            }),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session_id: SessionId = match id.parse() {
        Ok(id) => id,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_session_id",
                format!("{e}"),
            );
        }
    };

    match services
        .authority
        .revoke_owned_session(user.email(), session_id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "session revoked",
            }),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renew_body_is_optional() {
        assert_eq!(refresh_token_from_body(b""), Ok(None));
        assert_eq!(refresh_token_from_body(b"  \n"), Ok(None));
        assert_eq!(refresh_token_from_body(b"{}"), Ok(None));
        assert_eq!(refresh_token_from_body(br#"{"refresh_token":""}"#), Ok(None));
        assert_eq!(
            refresh_token_from_body(br#"{"refresh_token":"abc"}"#),
            Ok(Some("abc".to_string()))
        );
        assert!(refresh_token_from_body(b"not json").is_err());
    }
}
