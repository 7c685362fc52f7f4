use chrono::{DateTime, Utc};

use vidstream_core::{Entity, SessionId};

/// Server-side session: one row per login, keyed by the tokens' `jti`.
///
/// # Invariants
/// - `id` equals the session correlation id embedded in both tokens of the login.
/// - `email` must match the email claim of any refresh token naming this session.
/// - Only `revoked` ever changes after creation; logout deletes the row.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub email: String,
    pub refresh_token: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Entity for Session {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("refresh_token", &"<redacted>")
            .field("revoked", &self.revoked)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
