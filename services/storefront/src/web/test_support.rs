//! Port doubles for the service's tests.

use async_trait::async_trait;
use cinema_core::domain::{AuthSession, Favorite, Film, NewsletterSubscription, Registration, User};
use cinema_core::ports::{AuthService, CatalogService, PortError, PortResult};
use cinema_core::query::FilmQuery;

/// Answers every read with the same films, applying only the limit.
#[derive(Default)]
pub struct FixedCatalog {
    pub films: Vec<Film>,
}

#[async_trait]
impl CatalogService for FixedCatalog {
    async fn select_films(
        &self,
        query: &FilmQuery,
        _session: Option<&AuthSession>,
    ) -> PortResult<Vec<Film>> {
        let limit = query.limit.unwrap_or(self.films.len());
        Ok(self.films.iter().take(limit).cloned().collect())
    }

    async fn insert_favorite(&self, _favorite: Favorite, _session: &AuthSession) -> PortResult<()> {
        Ok(())
    }

    async fn favorite_films(&self, _session: &AuthSession) -> PortResult<Vec<Film>> {
        Ok(Vec::new())
    }

    async fn insert_subscription(
        &self,
        _subscription: NewsletterSubscription,
        _session: Option<&AuthSession>,
    ) -> PortResult<()> {
        Ok(())
    }
}

/// An auth endpoint that refuses every sign-in.
pub struct NoAuth;

#[async_trait]
impl AuthService for NoAuth {
    async fn sign_up(&self, _email: &str, _password: &str) -> PortResult<Registration> {
        Err(PortError::Rejected("Signups not allowed for this instance".to_string()))
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> PortResult<AuthSession> {
        Err(PortError::Unauthorized)
    }

    async fn sign_out(&self, _session: &AuthSession) -> PortResult<()> {
        Ok(())
    }

    async fn current_user(&self, _access_token: &str) -> PortResult<Option<User>> {
        Ok(None)
    }
}
