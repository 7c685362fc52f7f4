use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use vidstream_auth::AuthError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map an authority failure to a response.
///
/// `SessionNotFound` is a 404 here (logout, revoke); the renew route maps it
/// to 401 itself via [`renew_error_to_response`].
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let status = match &err {
        AuthError::InvalidCredentials
        | AuthError::InvalidToken(_)
        | AuthError::SessionRevoked
        | AuthError::SessionMismatch => StatusCode::UNAUTHORIZED,
        AuthError::DuplicateEmail => StatusCode::CONFLICT,
        AuthError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        AuthError::SessionNotFound | AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::StorageFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &err {
        // Backend detail stays in the logs.
        AuthError::StorageFailure(_) => "storage temporarily unavailable".to_string(),
        AuthError::Internal(_) => "internal error".to_string(),
        other => other.to_string(),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    if let AuthError::ValidationFailed(validation) = &err {
        return (
            status,
            axum::Json(json!({
                "error": err.code(),
                "message": message,
                "field": validation.field(),
            })),
        )
            .into_response();
    }

    json_error(status, err.code(), message)
}

/// Renewal without a live session is an authentication failure, not a missing resource.
pub fn renew_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::SessionNotFound => json_error(
            StatusCode::UNAUTHORIZED,
            AuthError::SessionNotFound.code(),
            "session not found",
        ),
        other => auth_error_to_response(other),
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidstream_auth::{TokenError, ValidationError};

    #[test]
    fn status_mapping() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (AuthError::SessionRevoked, StatusCode::UNAUTHORIZED),
            (AuthError::SessionMismatch, StatusCode::UNAUTHORIZED),
            (AuthError::DuplicateEmail, StatusCode::CONFLICT),
            (
                AuthError::ValidationFailed(ValidationError::NameLength),
                StatusCode::BAD_REQUEST,
            ),
            (AuthError::SessionNotFound, StatusCode::NOT_FOUND),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::StorageFailure("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(auth_error_to_response(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn validation_errors_name_the_field() {
        let response =
            auth_error_to_response(AuthError::ValidationFailed(ValidationError::PasswordTooLong));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["field"], "password");
        assert_eq!(body["error"], "validation_failed");
    }

    #[test]
    fn renew_treats_missing_session_as_unauthorized() {
        assert_eq!(
            renew_error_to_response(AuthError::SessionNotFound).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            renew_error_to_response(AuthError::SessionRevoked).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
