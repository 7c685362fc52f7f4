use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use vidstream_auth::{AuthRecord, CredentialStore, NewUser, Session, StoreError, User, UserChanges};
use vidstream_core::{Entity, SessionId, UserId};

/// In-memory credential store.
///
/// Intended for tests/dev. Email uniqueness is checked and enforced inside the
/// same write-lock critical section as the insert or update.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Storage("lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn persist_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            plan: user.plan,
            created_at: Utc::now(),
        };
        let id = *user.id();
        users.insert(id, user);
        Ok(id)
    }

    async fn get_auth_record(&self, email: &str) -> Result<AuthRecord, StoreError> {
        let users = self.users.read().map_err(Self::poisoned)?;
        users
            .values()
            .find(|u| u.email == email)
            .map(User::auth_record)
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        if let Some(email) = &changes.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.apply(&changes);
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<String, StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        users.remove(&id).map(|u| u.email).ok_or(StoreError::NotFound)
    }

    async fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        let id = *session.id();
        if sessions.contains_key(&id) {
            return Err(StoreError::Storage(format!("session {id} already exists")));
        }
        sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<Session, StoreError> {
        let sessions = self.sessions.read().map_err(Self::poisoned)?;
        sessions.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn revoke_session(&self, id: SessionId) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        if let Some(session) = sessions.get_mut(&id) {
            session.revoked = true;
        }
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        Ok(u64::from(sessions.remove(&id).is_some()))
    }

    async fn delete_sessions_for(&self, email: &str) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.email != email);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vidstream_core::Plan;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            plan: Plan::Standard,
        }
    }

    fn session(email: &str) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            email: email.to_string(),
            refresh_token: "refresh".to_string(),
            revoked: false,
            created_at: now,
            expires_at: now + Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn persist_then_lookup_by_email() {
        let store = InMemoryCredentialStore::new();
        let id = store.persist_user(new_user("a@example.com")).await.unwrap();

        let record = store.get_auth_record("a@example.com").await.unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.plan, Plan::Standard);
        assert_eq!(store.get_auth_record("b@example.com").await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryCredentialStore::new();
        store.persist_user(new_user("a@example.com")).await.unwrap();
        assert_eq!(
            store.persist_user(new_user("a@example.com")).await,
            Err(StoreError::DuplicateEmail)
        );
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn update_cannot_steal_another_email() {
        let store = InMemoryCredentialStore::new();
        store.persist_user(new_user("a@example.com")).await.unwrap();
        let b = store.persist_user(new_user("b@example.com")).await.unwrap();

        let changes = UserChanges {
            email: Some("a@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update_user(b, changes).await, Err(StoreError::DuplicateEmail));

        let own = UserChanges {
            email: Some("b@example.com".to_string()),
            name: Some("Bobby".to_string()),
            ..Default::default()
        };
        assert!(store.update_user(b, own).await.is_ok());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_user() {
        let store = InMemoryCredentialStore::new();
        let missing = UserId::new();
        assert_eq!(
            store.update_user(missing, UserChanges::default()).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.delete_user(missing).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_tolerates_unknown_ids() {
        let store = InMemoryCredentialStore::new();
        let s = store.create_session(session("a@example.com")).await.unwrap();

        store.revoke_session(s.id).await.unwrap();
        store.revoke_session(s.id).await.unwrap();
        assert!(store.get_session(s.id).await.unwrap().revoked);

        assert!(store.revoke_session(SessionId::new()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_session_reports_rows_removed() {
        let store = InMemoryCredentialStore::new();
        let s = store.create_session(session("a@example.com")).await.unwrap();

        assert_eq!(store.delete_session(s.id).await, Ok(1));
        assert_eq!(store.delete_session(s.id).await, Ok(0));
        assert_eq!(store.get_session(s.id).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_user_returns_email_and_sessions_can_be_purged_by_owner() {
        let store = InMemoryCredentialStore::new();
        let id = store.persist_user(new_user("a@example.com")).await.unwrap();
        store.create_session(session("a@example.com")).await.unwrap();
        store.create_session(session("a@example.com")).await.unwrap();
        let other = store.create_session(session("b@example.com")).await.unwrap();

        assert_eq!(store.delete_user(id).await.as_deref(), Ok("a@example.com"));
        assert_eq!(store.delete_sessions_for("a@example.com").await, Ok(2));
        assert_eq!(store.delete_sessions_for("a@example.com").await, Ok(0));
        assert_eq!(store.session_count(), 1);
        assert!(store.get_session(other.id).await.is_ok());
    }
}
