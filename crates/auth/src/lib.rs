//! `vidstream-auth`: credential verification and session/token lifecycle.
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence is
//! reached through the [`CredentialStore`] trait, and the HTTP layer only sees
//! [`SessionAuthority`] results and [`AuthError`] kinds.

pub mod authority;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod user;
pub mod validation;

pub use authority::{LoginOutcome, RenewedAccess, SessionAuthority, TokenTtls};
pub use claims::{Claims, Subject, TokenError, validate_claims};
pub use clock::{Clock, SystemClock};
pub use codec::{Hs256TokenCodec, IssuedToken, TokenCodec};
pub use error::AuthError;
pub use password::{BcryptHasher, HashError, PasswordHasher};
pub use session::Session;
pub use store::{CredentialStore, StoreError};
pub use user::{AuthRecord, NewUser, User, UserChanges, UserView};
pub use validation::{UserUpdate, ValidationError};
