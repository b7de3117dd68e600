//! crates/cinema_core/src/ports.rs
//!
//! Defines the service contracts (traits) the storefront core talks to.
//! The hosted backend is reached only through these traits, so the core stays
//! independent of the HTTP client and of the backend vendor.

use async_trait::async_trait;
use crate::domain::{AuthSession, Favorite, Film, NewsletterSubscription, Registration, User};
use crate::query::FilmQuery;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the remote service (HTTP, decoding).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Rejected by the backend: {0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Reads and writes against the remote collections.
///
/// `session` is the caller's authenticated session, if any. Row-level security
/// on the backend decides what an anonymous caller may see or write.
#[async_trait]
pub trait CatalogService: Send + Sync {
    // --- films ---
    async fn select_films(
        &self,
        query: &FilmQuery,
        session: Option<&AuthSession>,
    ) -> PortResult<Vec<Film>>;

    // --- favorites ---
    async fn insert_favorite(&self, favorite: Favorite, session: &AuthSession) -> PortResult<()>;

    /// Favorites of `session.user` joined with their film rows.
    async fn favorite_films(&self, session: &AuthSession) -> PortResult<Vec<Film>>;

    // --- newsletter ---
    async fn insert_subscription(
        &self,
        subscription: NewsletterSubscription,
        session: Option<&AuthSession>,
    ) -> PortResult<()>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<Registration>;

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<AuthSession>;

    async fn sign_out(&self, session: &AuthSession) -> PortResult<()>;

    /// Resolves the user behind an access token. `Ok(None)` means the token is
    /// no longer valid.
    async fn current_user(&self, access_token: &str) -> PortResult<Option<User>>;
}
