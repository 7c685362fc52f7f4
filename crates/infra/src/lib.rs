//! Infrastructure layer: credential store adapters and service configuration.

pub mod config;
pub mod credential_store;

pub use config::{ConfigError, ServiceConfig};
pub use credential_store::{InMemoryCredentialStore, PostgresCredentialStore};
