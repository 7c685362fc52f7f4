//! Postgres-backed credential store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation in a `users` write) | `23505` | `DuplicateEmail` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / Io / Tls / timeouts | N/A | `Storage` |
//!
//! Missing rows are detected with `fetch_optional` or `rows_affected` and
//! reported as `NotFound`, never through `sqlx::Error::RowNotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use vidstream_auth::{AuthRecord, CredentialStore, NewUser, Session, StoreError, UserChanges};
use vidstream_core::{Plan, SessionId, UserId};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    plan        SMALLINT NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id             UUID PRIMARY KEY,
    email          TEXT NOT NULL,
    refresh_token  TEXT NOT NULL,
    is_revoked     BOOLEAN NOT NULL DEFAULT FALSE,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at     TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_SESSIONS_EMAIL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sessions_email_idx ON sessions (email)";

/// Credential store over a Postgres connection pool.
///
/// `Send + Sync`; the pool handles connection sharing. Email uniqueness is
/// enforced by the `UNIQUE` constraint on `users.email`.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `users` and `sessions` tables if they do not exist.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in [CREATE_USERS, CREATE_SESSIONS, CREATE_SESSIONS_EMAIL_INDEX] {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip_all, fields(plan = %user.plan), err)]
    async fn persist_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        let id = UserId::new();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, plan)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.plan.as_i16())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("persist_user", e))?;
        Ok(id)
    }

    #[instrument(skip_all, err)]
    async fn get_auth_record(&self, email: &str) -> Result<AuthRecord, StoreError> {
        let row = sqlx::query("SELECT id, password, plan FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_auth_record", e))?
            .ok_or(StoreError::NotFound)?;

        let id: uuid::Uuid = row.try_get("id").map_err(|e| map_sqlx_error("get_auth_record", e))?;
        let password_hash: String = row
            .try_get("password")
            .map_err(|e| map_sqlx_error("get_auth_record", e))?;
        let plan: i16 = row.try_get("plan").map_err(|e| map_sqlx_error("get_auth_record", e))?;

        Ok(AuthRecord {
            id: UserId::from_uuid(id),
            password_hash,
            plan: decode_plan(plan)?,
        })
    }

    #[instrument(skip_all, fields(user_id = %id), err)]
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.password_hash.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = %id), err)]
    async fn delete_user(&self, id: UserId) -> Result<String, StoreError> {
        let row = sqlx::query("DELETE FROM users WHERE id = $1 RETURNING email")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?
            .ok_or(StoreError::NotFound)?;

        row.try_get("email")
            .map_err(|e| map_sqlx_error("delete_user", e))
    }

    #[instrument(skip_all, fields(session_id = %session.id), err)]
    async fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO sessions (id, email, refresh_token, is_revoked, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, refresh_token, is_revoked, created_at, expires_at
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(&session.email)
        .bind(&session.refresh_token)
        .bind(session.revoked)
        .bind(session.created_at)
        .bind(session.expires_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_session", e))?;

        SessionRow::from_row(&row)
            .map(Session::from)
            .map_err(|e| map_sqlx_error("create_session", e))
    }

    #[instrument(skip_all, fields(session_id = %id), err)]
    async fn get_session(&self, id: SessionId) -> Result<Session, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, refresh_token, is_revoked, created_at, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_session", e))?
        .ok_or(StoreError::NotFound)?;

        SessionRow::from_row(&row)
            .map(Session::from)
            .map_err(|e| map_sqlx_error("get_session", e))
    }

    #[instrument(skip_all, fields(session_id = %id), err)]
    async fn revoke_session(&self, id: SessionId) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET is_revoked = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke_session", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(session_id = %id), err)]
    async fn delete_session(&self, id: SessionId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_session", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip_all, err)]
    async fn delete_sessions_for(&self, email: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE email = $1")
            .bind(email)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_sessions_for", e))?;
        Ok(result.rows_affected())
    }
}

fn decode_plan(value: i16) -> Result<Plan, StoreError> {
    Plan::try_from(value).map_err(|e| StoreError::Storage(format!("corrupt users.plan: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            // Only `users` writes can hit the email constraint.
            let writes_users = matches!(operation, "persist_user" | "update_user");
            if writes_users && db_err.code().as_deref() == Some("23505") {
                return StoreError::DuplicateEmail;
            }
            StoreError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Storage(format!("connection pool timed out in {}", operation))
        }
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct SessionRow {
    id: uuid::Uuid,
    email: String,
    refresh_token: String,
    is_revoked: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SessionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SessionRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            refresh_token: row.try_get("refresh_token")?,
            is_revoked: row.try_get("is_revoked")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: SessionId::from_uuid(row.id),
            email: row.email,
            refresh_token: row.refresh_token,
            revoked: row.is_revoked,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}
