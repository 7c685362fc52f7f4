use thiserror::Error;

use crate::claims::TokenError;
use crate::password::HashError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Failure kinds surfaced by [`crate::SessionAuthority`].
///
/// Callers branch on the variant: `SessionRevoked` means "log in again",
/// `StorageFailure` means "may succeed on retry". Credential and token failures
/// never say whether the email exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] TokenError),

    #[error("session not found")]
    SessionNotFound,

    #[error("session revoked")]
    SessionRevoked,

    #[error("session does not match token")]
    SessionMismatch,

    #[error("user not found")]
    UserNotFound,

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::ValidationFailed(_) => "validation_failed",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::SessionNotFound => "session_not_found",
            AuthError::SessionRevoked => "session_revoked",
            AuthError::SessionMismatch => "session_mismatch",
            AuthError::UserNotFound => "user_not_found",
            AuthError::StorageFailure(_) => "storage_failure",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Only storage failures may succeed when retried unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::StorageFailure(_))
    }

    /// Map a store error where "not found" has no dedicated meaning.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::NotFound => AuthError::StorageFailure("unexpected missing record".to_string()),
            StoreError::Storage(msg) => AuthError::StorageFailure(msg),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::TooLong { .. } => AuthError::ValidationFailed(ValidationError::PasswordTooLong),
            HashError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_is_transient() {
        assert!(AuthError::StorageFailure("db down".into()).is_transient());
        assert!(!AuthError::SessionRevoked.is_transient());
        assert!(!AuthError::InvalidToken(TokenError::Expired).is_transient());
    }

    #[test]
    fn hash_too_long_is_a_validation_failure() {
        let err: AuthError = HashError::TooLong { max: 72 }.into();
        assert_eq!(err, AuthError::ValidationFailed(ValidationError::PasswordTooLong));
        assert_eq!(err.code(), "validation_failed");
    }

    #[test]
    fn store_mapping_keeps_duplicate_distinct() {
        assert_eq!(AuthError::from_store(StoreError::DuplicateEmail), AuthError::DuplicateEmail);
        assert!(matches!(
            AuthError::from_store(StoreError::Storage("x".into())),
            AuthError::StorageFailure(_)
        ));
    }
}
