//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: credential store selection and the session authority
//! - `routes/`: handlers (users, sessions, system)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: `AuthError` to status + `{"error", "message"}` bodies
//! - `cookies.rs`: the refresh-token cookie

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use vidstream_auth::StoreError;
use vidstream_infra::ServiceConfig;

use crate::middleware;

pub mod cookies;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ServiceConfig) -> Result<Router, StoreError> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: Arc::clone(&services),
    };

    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let v1 = routes::public_router().merge(protected);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/v1", v1)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}

pub use services::AppServices;
