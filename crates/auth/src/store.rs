//! Credential store boundary.

use std::sync::Arc;

use thiserror::Error;

use vidstream_core::{SessionId, UserId};

use crate::session::Session;
use crate::user::{AuthRecord, NewUser, UserChanges};

/// Credential store operation error.
///
/// `NotFound` and `DuplicateEmail` are definite answers; `Storage` covers
/// everything else (connectivity, pool exhaustion, unexpected rows) and is the
/// only potentially transient outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Durable owner of users and sessions.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - enforce email uniqueness atomically (a unique constraint or a single
///   critical section), never check-then-insert across two steps
/// - provide at least read-committed visibility
/// - report a missing row as `StoreError::NotFound`, not as `Storage`
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user and return its identifier.
    async fn persist_user(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Look up the login record for `email`.
    async fn get_auth_record(&self, email: &str) -> Result<AuthRecord, StoreError>;

    /// Apply the provided fields to user `id`.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<(), StoreError>;

    /// Delete user `id`, returning the email it was registered under.
    async fn delete_user(&self, id: UserId) -> Result<String, StoreError>;

    async fn create_session(&self, session: Session) -> Result<Session, StoreError>;

    async fn get_session(&self, id: SessionId) -> Result<Session, StoreError>;

    /// Mark a session revoked. Revoking an already revoked or unknown session is not an error.
    async fn revoke_session(&self, id: SessionId) -> Result<(), StoreError>;

    /// Delete a session, returning the number of rows removed.
    async fn delete_session(&self, id: SessionId) -> Result<u64, StoreError>;

    /// Delete every session owned by `email`, returning the number removed.
    async fn delete_sessions_for(&self, email: &str) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn persist_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        (**self).persist_user(user).await
    }

    async fn get_auth_record(&self, email: &str) -> Result<AuthRecord, StoreError> {
        (**self).get_auth_record(email).await
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<(), StoreError> {
        (**self).update_user(id, changes).await
    }

    async fn delete_user(&self, id: UserId) -> Result<String, StoreError> {
        (**self).delete_user(id).await
    }

    async fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        (**self).create_session(session).await
    }

    async fn get_session(&self, id: SessionId) -> Result<Session, StoreError> {
        (**self).get_session(id).await
    }

    async fn revoke_session(&self, id: SessionId) -> Result<(), StoreError> {
        (**self).revoke_session(id).await
    }

    async fn delete_session(&self, id: SessionId) -> Result<u64, StoreError> {
        (**self).delete_session(id).await
    }

    async fn delete_sessions_for(&self, email: &str) -> Result<u64, StoreError> {
        (**self).delete_sessions_for(email).await
    }
}
