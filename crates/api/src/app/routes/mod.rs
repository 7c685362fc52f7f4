use axum::{
    routing::{get, post},
    Router,
};

pub mod sessions;
pub mod system;
pub mod users;

/// Endpoints reachable without an access token.
pub fn public_router() -> Router {
    Router::new()
        .route("/user", post(users::create_user))
        .route("/login", post(sessions::login))
        .route("/renew", post(sessions::renew))
}

/// Endpoints that require a bearer access token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/user", axum::routing::put(users::update_user).delete(users::delete_user))
        .route("/whoami", get(system::whoami))
        .route("/logout", post(sessions::logout))
        .route("/revoke/:id", post(sessions::revoke))
}
