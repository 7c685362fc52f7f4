//! Signed token codec (compact JWS, HMAC-SHA256).

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use vidstream_core::SessionId;

use crate::claims::{Claims, Subject, TokenError, validate_claims};

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Token issuing/verification boundary.
///
/// Implementations own the signing material. Both operations are pure: no I/O,
/// and `now` is supplied by the caller.
pub trait TokenCodec: Send + Sync {
    /// Sign a claim set for `subject`, tagged with the caller's `session_id`.
    fn issue(
        &self,
        subject: &Subject,
        session_id: SessionId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError>;

    /// Verify signature and time window, returning the decoded claims.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

impl<C> TokenCodec for Arc<C>
where
    C: TokenCodec + ?Sized,
{
    fn issue(
        &self,
        subject: &Subject,
        session_id: SessionId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        (**self).issue(subject, session_id, ttl, now)
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        (**self).verify(token, now)
    }
}

/// HS256 codec over a process-wide secret.
#[derive(Clone)]
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(
        &self,
        subject: &Subject,
        session_id: SessionId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        // NumericDate has second precision; truncate so issued claims equal decoded ones.
        let issued_at = now.trunc_subsecs(0);
        let expires_at = (issued_at + ttl).trunc_subsecs(0);

        let claims = Claims {
            user_id: subject.user_id,
            email: subject.email.clone(),
            plan: subject.plan,
            session_id,
            sub: subject.email.clone(),
            issued_at,
            expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(map_decode_error)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        _ => TokenError::Malformed,
    }
}
