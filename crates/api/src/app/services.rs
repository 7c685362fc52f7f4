//! Service wiring: picks a credential store from config and builds the authority.

use std::sync::Arc;

use vidstream_auth::{BcryptHasher, CredentialStore, Hs256TokenCodec, SessionAuthority, StoreError};
use vidstream_infra::{InMemoryCredentialStore, PostgresCredentialStore, ServiceConfig};

pub type DynCredentialStore = Arc<dyn CredentialStore>;

pub type Authority = SessionAuthority<DynCredentialStore, Hs256TokenCodec, BcryptHasher>;

/// Shared state handed to every handler.
pub struct AppServices {
    pub authority: Authority,
}

impl AppServices {
    pub fn new(authority: Authority) -> Self {
        Self { authority }
    }
}

/// Build services from config.
///
/// With `USERS_DATABASE_URL` set, connects to Postgres and bootstraps the
/// schema; otherwise everything lives in memory and is lost on restart.
pub async fn build_services(config: &ServiceConfig) -> Result<AppServices, StoreError> {
    let store: DynCredentialStore = match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresCredentialStore::connect(url, config.database_max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres credential store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("USERS_DATABASE_URL not set; using in-memory credential store");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let authority = SessionAuthority::new(
        store,
        Hs256TokenCodec::new(config.jwt_secret.as_bytes()),
        BcryptHasher::new(config.bcrypt_cost),
    )
    .with_ttls(config.token_ttls());

    Ok(AppServices::new(authority))
}
