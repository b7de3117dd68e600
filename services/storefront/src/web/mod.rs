pub mod auth;
pub mod events;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use events::event_handler;
pub use middleware::assign_visitor;
pub use rest::favorites_handler;

use crate::web::state::AppState;

/// Builds the storefront routes. Every route runs behind the visitor middleware.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/events", post(event_handler))
        .route("/favorites", get(favorites_handler))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .layer(axum_middleware::from_fn(assign_visitor))
        .with_state(app_state)
}
