//! Session authority: login, renewal, logout and revocation.
//!
//! Lifecycle of one logical session:
//!
//! ```text
//! NoSession --login--> Active --renew--> Active (same session id, new access token)
//!                        |--revoke--> Revoked     (terminal, row kept for audit)
//!                        '--logout--> LoggedOut   (terminal, row deleted)
//! ```
//!
//! The authority holds no mutable state; all durable state lives behind the
//! [`CredentialStore`]. Refresh tokens are not rotated on renewal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use vidstream_core::{Plan, SessionId, UserId};

use crate::claims::{Claims, Subject};
use crate::clock::{Clock, SystemClock};
use crate::codec::TokenCodec;
use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::session::Session;
use crate::store::{CredentialStore, StoreError};
use crate::user::{NewUser, UserChanges, UserView};
use crate::validation::{self, UserUpdate};

/// Lifetimes of the two tokens issued at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::hours(24),
        }
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session_id: SessionId,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub user: UserView,
}

/// Successful renewal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewedAccess {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
}

pub struct SessionAuthority<S, C, H> {
    store: S,
    codec: C,
    hasher: Arc<H>,
    ttls: TokenTtls,
    clock: Arc<dyn Clock>,
}

impl<S, C, H> SessionAuthority<S, C, H>
where
    S: CredentialStore,
    C: TokenCodec,
    H: PasswordHasher + 'static,
{
    pub fn new(store: S, codec: C, hasher: H) -> Self {
        Self {
            store,
            codec,
            hasher: Arc::new(hasher),
            ttls: TokenTtls::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttls(mut self, ttls: TokenTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a user. No tokens are issued.
    #[instrument(skip_all, fields(plan = %plan), err)]
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        plan: Plan,
        password: &str,
    ) -> Result<UserId, AuthError> {
        validation::validate_name(name)?;
        let email = validation::parse_email(email)?;
        validation::validate_password(password)?;

        let password_hash = self.hash_password(password).await?;
        let user_id = self
            .store
            .persist_user(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                plan,
            })
            .await
            .map_err(AuthError::from_store)?;

        tracing::info!(user_id = %user_id, "user registered");
        Ok(user_id)
    }

    /// Check credentials and open a new session.
    #[instrument(skip_all, fields(session_id = tracing::field::Empty), err)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let record = match self.store.get_auth_record(email).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                // Spend the same CPU as a real check so response time does not reveal the email.
                if let Err(e) = self.hash_password(password).await {
                    tracing::debug!(error = %e, "dummy hash for unknown email failed");
                }
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::from_store(e)),
        };

        if !self.verify_password(password, record.password_hash.clone()).await? {
            tracing::debug!(user_id = %record.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let session_id = SessionId::new();
        tracing::Span::current().record("session_id", tracing::field::display(session_id));

        let subject = Subject {
            user_id: record.id,
            email: email.to_string(),
            plan: record.plan,
        };
        let access = self
            .codec
            .issue(&subject, session_id, self.ttls.access, now)
            .map_err(|e| AuthError::Internal(format!("failed to create access token: {e}")))?;
        let refresh = self
            .codec
            .issue(&subject, session_id, self.ttls.refresh, now)
            .map_err(|e| AuthError::Internal(format!("failed to create refresh token: {e}")))?;

        let session = self
            .store
            .create_session(Session {
                id: session_id,
                email: email.to_string(),
                refresh_token: refresh.token.clone(),
                revoked: false,
                created_at: now,
                expires_at: refresh.claims.expires_at,
            })
            .await
            .map_err(AuthError::from_store)?;

        tracing::info!(user_id = %record.id, "session opened");
        Ok(LoginOutcome {
            session_id: session.id,
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.claims.expires_at,
            refresh_expires_at: refresh.claims.expires_at,
            user: UserView {
                id: record.id,
                email: email.to_string(),
                plan: record.plan,
            },
        })
    }

    /// Trade a refresh token for a new access token in the same session.
    #[instrument(skip_all, fields(session_id = tracing::field::Empty), err)]
    pub async fn renew_access_token(&self, refresh_token: &str) -> Result<RenewedAccess, AuthError> {
        let now = self.clock.now();
        let claims = self
            .codec
            .verify(refresh_token, now)
            .map_err(AuthError::InvalidToken)?;
        tracing::Span::current().record("session_id", tracing::field::display(claims.session_id));

        let session = self
            .store
            .get_session(claims.session_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::SessionNotFound,
                other => AuthError::from_store(other),
            })?;

        if session.revoked {
            return Err(AuthError::SessionRevoked);
        }
        if session.email != claims.email {
            tracing::warn!("refresh token email does not match session owner");
            return Err(AuthError::SessionMismatch);
        }

        let access = self
            .codec
            .issue(&claims.subject(), claims.session_id, self.ttls.access, now)
            .map_err(|e| AuthError::Internal(format!("failed to create access token: {e}")))?;

        Ok(RenewedAccess {
            access_token: access.token,
            access_expires_at: access.claims.expires_at,
        })
    }

    /// Verify an access token presented on a request.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec
            .verify(token, self.clock.now())
            .map_err(AuthError::InvalidToken)
    }

    /// Delete the session. A second logout reports `SessionNotFound`.
    #[instrument(skip_all, fields(session_id = %session_id), err)]
    pub async fn logout(&self, session_id: SessionId) -> Result<(), AuthError> {
        let removed = self
            .store
            .delete_session(session_id)
            .await
            .map_err(AuthError::from_store)?;
        if removed == 0 {
            return Err(AuthError::SessionNotFound);
        }
        tracing::info!("session closed");
        Ok(())
    }

    /// Block future renewals for the session; the row is kept.
    ///
    /// Access tokens already issued stay valid until they expire.
    #[instrument(skip_all, fields(session_id = %session_id), err)]
    pub async fn revoke_session(&self, session_id: SessionId) -> Result<(), AuthError> {
        self.store
            .revoke_session(session_id)
            .await
            .map_err(AuthError::from_store)?;
        tracing::info!("session revoked");
        Ok(())
    }

    /// Revoke a session only if `owner_email` owns it.
    ///
    /// Sessions of other users are reported as `SessionNotFound`.
    #[instrument(skip_all, fields(session_id = %session_id), err)]
    pub async fn revoke_owned_session(
        &self,
        owner_email: &str,
        session_id: SessionId,
    ) -> Result<(), AuthError> {
        let session = self
            .store
            .get_session(session_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::SessionNotFound,
                other => AuthError::from_store(other),
            })?;
        if session.email != owner_email {
            return Err(AuthError::SessionNotFound);
        }
        self.revoke_session(session_id).await
    }

    /// Validate then apply profile changes. Nothing is written if any field is invalid.
    #[instrument(skip_all, fields(user_id = %id), err)]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<(), AuthError> {
        let update = update.validate()?;

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let changes = UserChanges {
            name: update.name,
            email: update.email,
            password_hash,
        };

        self.store
            .update_user(id, changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::UserNotFound,
                other => AuthError::from_store(other),
            })?;
        tracing::info!("user updated");
        Ok(())
    }

    /// Delete the user and every session they own.
    ///
    /// Refresh tokens issued to the account stop renewing at once; access
    /// tokens already issued stay valid until they expire.
    #[instrument(skip_all, fields(user_id = %id), err)]
    pub async fn delete_user(&self, id: UserId) -> Result<(), AuthError> {
        let email = self.store.delete_user(id).await.map_err(|e| match e {
            StoreError::NotFound => AuthError::UserNotFound,
            other => AuthError::from_store(other),
        })?;
        let sessions = self
            .store
            .delete_sessions_for(&email)
            .await
            .map_err(AuthError::from_store)?;
        tracing::info!(sessions, "user deleted");
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: &str, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))
    }
}
