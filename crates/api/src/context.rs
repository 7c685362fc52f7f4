use vidstream_auth::Claims;
use vidstream_core::{Plan, SessionId, UserId};

/// Authenticated caller, derived from a verified access token.
///
/// Inserted into request extensions by the auth middleware; every protected
/// route reads it instead of trusting ids from the path or body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
    email: String,
    plan: Plan,
    session_id: SessionId,
}

impl UserContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            plan: claims.plan,
            session_id: claims.session_id,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}
