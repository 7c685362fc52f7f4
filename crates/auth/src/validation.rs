//! Field validation for registration and profile updates.
//!
//! Errors name the field and the rule only; the offending input is never
//! echoed back.

use std::str::FromStr;

use lettre::message::Mailbox;
use thiserror::Error;

use crate::password::MAX_PASSWORD_BYTES;

pub const NAME_MIN_CHARS: usize = 4;
pub const NAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 8;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be between 4 and 20 characters")]
    NameLength,

    #[error("email cannot be empty when provided")]
    EmailEmpty,

    #[error("invalid email format")]
    EmailFormat,

    #[error("password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("password must be at most 72 bytes long")]
    PasswordTooLong,

    #[error("no fields provided")]
    NoChanges,
}

impl ValidationError {
    /// Field category the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameLength => "name",
            ValidationError::EmailEmpty | ValidationError::EmailFormat => "email",
            ValidationError::PasswordTooShort | ValidationError::PasswordTooLong => "password",
            ValidationError::NoChanges => "body",
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::NameLength);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

/// Parse an RFC 5322 mailbox and return its bare address.
///
/// Accepts `local@domain`, `Display Name <local@domain>` and the comment and
/// folding-whitespace forms the RFC allows around them.
pub fn parse_email(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    let mailbox = Mailbox::from_str(trimmed).map_err(|_| ValidationError::EmailFormat)?;
    Ok(mailbox.email.to_string())
}

/// Requested profile changes, in plaintext, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserUpdate {
    /// Validate every provided field.
    ///
    /// Returns the update with its email reduced to the bare address. Any
    /// invalid field rejects the whole update.
    pub fn validate(self) -> Result<UserUpdate, ValidationError> {
        if self.name.is_none() && self.email.is_none() && self.password.is_none() {
            return Err(ValidationError::NoChanges);
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        let email = self.email.as_deref().map(parse_email).transpose()?;
        if let Some(password) = &self.password {
            validate_password(password)?;
        }

        Ok(UserUpdate {
            name: self.name,
            email,
            password: self.password,
        })
    }
}
