//! crates/cinema_core/src/storefront.rs
//!
//! The storefront context object. One `Storefront` backs one page session: it
//! owns the session and the film snapshot, issues queries through the ports and
//! writes the rendered results to a [`Page`].
//!
//! List operations never fail past their own boundary. They log, then render an
//! inline error or raise a notice. Only registration and login hand errors back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{AuthSession, Favorite, Film, FilmId, NewsletterSubscription, Registration, User};
use crate::error::{StorefrontError, StorefrontResult};
use crate::page::{ElementId, Page, HIDDEN_CLASS};
use crate::ports::{AuthService, CatalogService};
use crate::query::FilmQuery;
use crate::view;

/// Queries shorter than this (in characters) show the full catalog instead.
pub const MIN_SEARCH_CHARS: usize = 2;
pub const RECOMMENDATION_COUNT: usize = 3;

//=========================================================================================
// User-facing Notices
//=========================================================================================

pub const LOAD_FAILED: &str = "Ошибка загрузки фильмов";
pub const CATEGORY_FAILED: &str = "Ошибка загрузки";
pub const RECOMMENDATIONS_FAILED: &str = "Ошибка загрузки рекомендаций";
pub const SIGN_IN_PROMPT: &str = "Пожалуйста, войдите в систему чтобы добавить в избранное";
pub const FAVORITE_ADDED: &str = "Фильм добавлен в избранное!";
pub const FAVORITE_FAILED: &str = "Ошибка добавления в избранное";
pub const EMAIL_PROMPT: &str = "Пожалуйста, введите email";
pub const SUBSCRIBED: &str = "Вы успешно подписались на рассылку!";
pub const SUBSCRIBE_FAILED: &str = "Ошибка подписки на рассылку";
pub const VIDEO_UNAVAILABLE: &str = "Видео недоступно для просмотра";

//=========================================================================================
// Request Sequencing
//=========================================================================================

/// Hands out increasing tickets so a response can tell whether a newer
/// request for the same container was issued while it was in flight.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequencer {
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

//=========================================================================================
// Storefront
//=========================================================================================

#[derive(Default)]
struct SessionState {
    session: Option<AuthSession>,
    /// The full catalog as of the last `load_all_films`.
    snapshot: Vec<Film>,
}

pub struct Storefront {
    catalog: Arc<dyn CatalogService>,
    auth: Arc<dyn AuthService>,
    state: Mutex<SessionState>,
    grid_requests: RequestSequencer,
    snapshot_requests: RequestSequencer,
    panel_requests: RequestSequencer,
}

impl Storefront {
    pub fn new(catalog: Arc<dyn CatalogService>, auth: Arc<dyn AuthService>) -> Self {
        Self {
            catalog,
            auth,
            state: Mutex::new(SessionState::default()),
            grid_requests: RequestSequencer::default(),
            snapshot_requests: RequestSequencer::default(),
            panel_requests: RequestSequencer::default(),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.session.as_ref().map(|s| s.user.clone())
    }

    async fn session(&self) -> Option<AuthSession> {
        self.state.lock().await.session.clone()
    }

    async fn fetch(&self, query: &FilmQuery) -> StorefrontResult<Vec<Film>> {
        let session = self.session().await;
        self.catalog
            .select_films(query, session.as_ref())
            .await
            .map_err(StorefrontError::Query)
    }

    // --- Film lists ---

    /// Fetches the whole catalog, replaces the snapshot and renders the grid.
    /// A call superseded by a search or category load still refreshes the
    /// snapshot, unless a newer full load was issued in the meantime.
    pub async fn load_all_films(&self, page: &mut dyn Page) {
        let grid_ticket = self.grid_requests.issue();
        let snapshot_ticket = self.snapshot_requests.issue();
        let result = self.fetch(&FilmQuery::by_rating()).await;
        if let Ok(films) = &result {
            let mut state = self.state.lock().await;
            if self.snapshot_requests.is_current(snapshot_ticket) {
                state.snapshot = films.clone();
            }
        }
        self.show_grid(page, grid_ticket, result, Some(LOAD_FAILED));
    }

    pub async fn search_films(&self, page: &mut dyn Page, query: &str) {
        if query.chars().count() < MIN_SEARCH_CHARS {
            return self.load_all_films(page).await;
        }

        let ticket = self.grid_requests.issue();
        debug!("Searching titles for {:?}", query);
        let result = self.fetch(&FilmQuery::title_search(query)).await;
        self.show_grid(page, ticket, result, None);
    }

    pub async fn load_films_by_category(&self, page: &mut dyn Page, category: &str) {
        let ticket = self.grid_requests.issue();
        page.set_html(ElementId::FilmsGrid, view::loading().render());

        debug!("Loading category {:?}", category);
        let result = self.fetch(&FilmQuery::category(category)).await;
        self.show_grid(page, ticket, result, Some(CATEGORY_FAILED));
    }

    /// Writes a grid response unless a newer grid request was issued meanwhile.
    /// Without a `failure` notice a failed request leaves the grid untouched.
    fn show_grid(
        &self,
        page: &mut dyn Page,
        ticket: Ticket,
        result: StorefrontResult<Vec<Film>>,
        failure: Option<&str>,
    ) {
        if !self.grid_requests.is_current(ticket) {
            debug!("Dropping stale grid response");
            return;
        }
        match result {
            Ok(films) => page.set_html(ElementId::FilmsGrid, view::film_grid(&films).render()),
            Err(e) => {
                error!("Failed to load films: {}", e);
                if let Some(message) = failure {
                    page.set_html(ElementId::FilmsGrid, view::inline_error(message).render());
                }
            }
        }
    }

    pub async fn load_recommendations(&self, page: &mut dyn Page) {
        let ticket = self.panel_requests.issue();
        page.set_html(ElementId::RecommendationsGrid, view::loading().render());

        let query = FilmQuery::by_rating().limit(RECOMMENDATION_COUNT);
        let result = self.fetch(&query).await;
        if !self.panel_requests.is_current(ticket) {
            debug!("Dropping stale recommendations response");
            return;
        }
        match result {
            Ok(films) => page.set_html(
                ElementId::RecommendationsGrid,
                view::recommendations(&films).render(),
            ),
            Err(e) => {
                error!("Failed to load recommendations: {}", e);
                page.set_html(
                    ElementId::RecommendationsGrid,
                    view::inline_error(RECOMMENDATIONS_FAILED).render(),
                );
            }
        }
    }

    /// Opens the film's video if the snapshot knows one.
    pub async fn play_film(&self, page: &mut dyn Page, film_id: FilmId) {
        let url = {
            let state = self.state.lock().await;
            state
                .snapshot
                .iter()
                .find(|f| f.id == film_id)
                .and_then(|f| f.video_url.clone())
        };
        match url {
            Some(url) => page.open_url(&url),
            None => page.alert(VIDEO_UNAVAILABLE),
        }
    }

    // --- Writes ---

    pub async fn add_to_favorites(&self, page: &mut dyn Page, film_id: FilmId) {
        match self.try_add_to_favorites(film_id).await {
            Ok(()) => page.alert(FAVORITE_ADDED),
            Err(StorefrontError::SignedOut) => {
                warn!("Favorite for film {} requested without a session", film_id);
                page.alert(SIGN_IN_PROMPT);
            }
            Err(e) => {
                error!("Failed to add film {} to favorites: {}", film_id, e);
                page.alert(FAVORITE_FAILED);
            }
        }
    }

    async fn try_add_to_favorites(&self, film_id: FilmId) -> StorefrontResult<()> {
        let session = self.session().await.ok_or(StorefrontError::SignedOut)?;
        let favorite = Favorite {
            user_id: session.user.id,
            film_id,
        };
        self.catalog
            .insert_favorite(favorite, &session)
            .await
            .map_err(StorefrontError::Query)
    }

    /// Subscribes the address in the newsletter field and clears it on success.
    pub async fn subscribe_newsletter(&self, page: &mut dyn Page) {
        let email = page.value(ElementId::NewsletterEmail);
        match self.try_subscribe(&email).await {
            Ok(()) => {
                page.alert(SUBSCRIBED);
                page.set_value(ElementId::NewsletterEmail, String::new());
            }
            Err(StorefrontError::Validation(prompt)) => {
                warn!("Newsletter form submitted without an email");
                page.alert(prompt);
            }
            Err(e) => {
                error!("Newsletter subscription failed: {}", e);
                page.alert(SUBSCRIBE_FAILED);
            }
        }
    }

    async fn try_subscribe(&self, email: &str) -> StorefrontResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StorefrontError::Validation(EMAIL_PROMPT));
        }
        let subscription = NewsletterSubscription {
            email: email.to_string(),
            subscribed_at: Utc::now(),
        };
        let session = self.session().await;
        self.catalog
            .insert_subscription(subscription, session.as_ref())
            .await
            .map_err(StorefrontError::Query)
    }

    // --- Auth ---

    pub async fn register_user(&self, email: &str, password: &str) -> StorefrontResult<Registration> {
        self.auth.sign_up(email, password).await.map_err(|e| {
            error!("Registration failed: {}", e);
            StorefrontError::Auth(e)
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> StorefrontResult<User> {
        let session = self.auth.sign_in(email, password).await.map_err(|e| {
            error!("Login failed: {}", e);
            StorefrontError::Auth(e)
        })?;
        let user = session.user.clone();
        info!("User {} signed in", user.id);
        self.state.lock().await.session = Some(session);
        Ok(user)
    }

    /// Ends the session locally even when the remote sign-out fails.
    pub async fn logout_user(&self) {
        let Some(session) = self.state.lock().await.session.take() else {
            return;
        };
        match self.auth.sign_out(&session).await {
            Ok(()) => info!("User {} signed out", session.user.id),
            Err(e) => error!("Sign-out failed: {}", e),
        }
    }

    /// Re-validates a stored session against the auth endpoint.
    pub async fn check_session(&self) {
        let Some(token) = self.session().await.map(|s| s.access_token) else {
            return;
        };
        match self.auth.current_user(&token).await {
            Ok(Some(user)) => {
                let mut state = self.state.lock().await;
                if let Some(session) = state.session.as_mut() {
                    session.user = user;
                }
            }
            Ok(None) => {
                info!("Stored session is no longer valid");
                self.state.lock().await.session = None;
            }
            Err(e) => error!("Session check failed: {}", e),
        }
    }

    pub async fn get_favorites(&self) -> Vec<Film> {
        let Some(session) = self.session().await else {
            return Vec::new();
        };
        match self.catalog.favorite_films(&session).await {
            Ok(films) => films,
            Err(e) => {
                error!("Failed to load favorites: {}", e);
                Vec::new()
            }
        }
    }

    // --- Mobile chrome ---

    pub fn toggle_mobile_menu(&self, page: &mut dyn Page) {
        page.toggle_class(ElementId::MobileMenu, HIDDEN_CLASS);
    }

    /// Shows or hides the mobile search box; showing it also opens the menu.
    pub fn toggle_mobile_search(&self, page: &mut dyn Page) {
        let hidden = page.toggle_class(ElementId::MobileSearchContainer, HIDDEN_CLASS);
        if !hidden {
            page.remove_class(ElementId::MobileMenu, HIDDEN_CLASS);
        }
    }
}
