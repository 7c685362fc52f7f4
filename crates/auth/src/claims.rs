use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vidstream_core::{Plan, SessionId, UserId};

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub user_id: UserId,
    pub email: String,
    pub plan: Plan,
}

/// JWT claims model shared by access and refresh tokens.
///
/// Both token kinds from one login carry the same `session_id`; they differ
/// only in how far `expires_at` lies from `issued_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user identifier.
    #[serde(rename = "id")]
    pub user_id: UserId,

    pub email: String,

    pub plan: Plan,

    /// Session correlation id (`jti`), names the server-side session row.
    #[serde(rename = "jti")]
    pub session_id: SessionId,

    /// Registered subject claim; always the subject email.
    pub sub: String,

    /// Issued-at timestamp (whole seconds).
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp (whole seconds).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn subject(&self) -> Subject {
        Subject {
            user_id: self.user_id,
            email: self.email.clone(),
            plan: self.plan,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token has an invalid time window")]
    InvalidTimeWindow,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens in the codec; expiry is checked here,
/// explicitly, against the caller's `now`.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
        Claims {
            user_id: UserId::new(),
            email: "a@b.com".to_string(),
            plan: Plan::Standard,
            session_id: SessionId::new(),
            sub: "a@b.com".to_string(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::minutes(15));
        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(validate_claims(&claims, t0 + Duration::minutes(14)), Ok(()));
    }

    #[test]
    fn expired_at_exact_boundary() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::minutes(15));
        assert_eq!(
            validate_claims(&claims, t0 + Duration::minutes(15)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn rejects_future_and_inverted_windows() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::minutes(15));
        assert_eq!(
            validate_claims(&claims, t0 - Duration::seconds(1)),
            Err(TokenError::NotYetValid)
        );

        let inverted = claims_at(t0, Duration::seconds(0));
        assert_eq!(validate_claims(&inverted, t0), Err(TokenError::InvalidTimeWindow));
    }

    #[test]
    fn wire_names_follow_registered_claims() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(24));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["jti"], claims.session_id.to_string());
        assert_eq!(json["id"], claims.user_id.to_string());
        assert_eq!(json["sub"], "a@b.com");
        assert_eq!(json["plan"], 1);
        assert_eq!(json["iat"], t0.timestamp());
        assert_eq!(json["exp"], (t0 + Duration::hours(24)).timestamp());
    }
}
