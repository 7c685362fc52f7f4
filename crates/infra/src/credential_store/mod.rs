//! Credential store adapters.
//!
//! - `in_memory`: lock-guarded maps, for tests and local development
//! - `postgres`: sqlx-backed store with a unique constraint on email

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;
