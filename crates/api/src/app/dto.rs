use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidstream_auth::{LoginOutcome, RenewedAccess, UserUpdate, UserView};
use vidstream_core::{Plan, SessionId, UserId};

use crate::context::UserContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub plan: Plan,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenewRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: &'static str,
    pub id: UserId,
}

/// Login body. The refresh token itself travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub session_id: SessionId,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub user: UserView,
}

impl From<&LoginOutcome> for LoginResponse {
    fn from(outcome: &LoginOutcome) -> Self {
        LoginResponse {
            message: "login successful",
            session_id: outcome.session_id,
            access_token: outcome.access_token.clone(),
            access_token_expires_at: outcome.access_expires_at,
            refresh_token_expires_at: outcome.refresh_expires_at,
            user: outcome.user.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub message: &'static str,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

impl From<RenewedAccess> for RenewResponse {
    fn from(renewed: RenewedAccess) -> Self {
        RenewResponse {
            message: "token renewed",
            access_token: renewed.access_token,
            access_token_expires_at: renewed.access_expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub id: UserId,
    pub email: String,
    pub plan: Plan,
    pub session_id: SessionId,
}

impl From<&UserContext> for WhoAmIResponse {
    fn from(ctx: &UserContext) -> Self {
        WhoAmIResponse {
            id: ctx.user_id(),
            email: ctx.email().to_string(),
            plan: ctx.plan(),
            session_id: ctx.session_id(),
        }
    }
}
