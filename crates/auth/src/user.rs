//! User records as seen by the authentication core.
//!
//! Password hashes never leave this layer in a public shape: [`UserView`] has
//! no hash field and the `Debug` impls below redact it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vidstream_core::{Entity, Plan, UserId};

/// Full user record, as held by a credential store.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            plan: self.plan,
        }
    }

    pub fn auth_record(&self) -> AuthRecord {
        AuthRecord {
            id: self.id,
            password_hash: self.password_hash.clone(),
            plan: self.plan,
        }
    }

    /// Apply the provided fields of `changes`; absent fields are left untouched.
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(hash) = &changes.password_hash {
            self.password_hash = hash.clone();
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("plan", &self.plan)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Registration payload handed to the store (password already hashed).
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plan: Plan,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("plan", &self.plan)
            .finish()
    }
}

/// The subset of a user needed to check a login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthRecord {
    pub id: UserId,
    pub password_hash: String,
    pub plan: Plan,
}

impl core::fmt::Debug for AuthRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthRecord")
            .field("id", &self.id)
            .field("password_hash", &"<redacted>")
            .field("plan", &self.plan)
            .finish()
    }
}

/// Public projection of a user returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub plan: Plan,
}

/// Field-level changes for a stored user. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            plan: Plan::Free,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn debug_redacts_password_hash() {
        let rendered = format!("{:?}", user());
        assert!(!rendered.contains("$2b$04$secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn view_has_no_hash() {
        let json = serde_json::to_value(user().view()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let mut u = user();
        u.apply(&UserChanges {
            name: Some("Alicia".to_string()),
            ..Default::default()
        });
        assert_eq!(u.name, "Alicia");
        assert_eq!(u.email, "alice@example.com");
        assert_eq!(u.password_hash, "$2b$04$secret");
    }
}
