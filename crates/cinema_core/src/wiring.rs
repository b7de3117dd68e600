//! crates/cinema_core/src/wiring.rs
//!
//! Maps page events onto storefront operations.

use tracing::{debug, info};

use crate::domain::FilmId;
use crate::page::{ElementId, Page};
use crate::storefront::Storefront;

/// DOM event types the shell listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Input,
    Click,
}

/// What a bound listener does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Search,
    ToggleMobileMenu,
}

/// Listeners the shell registers on load: element, event, handler.
pub const LISTENERS: &[(ElementId, EventKind, Handler)] = &[
    (ElementId::SearchInputDesktop, EventKind::Input, Handler::Search),
    (ElementId::SearchInputMobile, EventKind::Input, Handler::Search),
    (ElementId::MobileMenuButton, EventKind::Click, Handler::ToggleMobileMenu),
];

pub fn listener_for(element: ElementId, kind: EventKind) -> Option<Handler> {
    LISTENERS
        .iter()
        .find(|(e, k, _)| *e == element && *k == kind)
        .map(|(_, _, handler)| *handler)
}

/// Everything the page can report back.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The document finished loading.
    PageReady,
    /// A bound listener fired on `element`.
    Dom { element: ElementId, kind: EventKind },
    CategorySelected(String),
    PlayClicked(FilmId),
    FavoriteClicked(FilmId),
    NewsletterSubmitted,
    RetryClicked,
    MobileSearchToggled,
}

impl Storefront {
    /// Initial load: both film panels once, with the session check alongside.
    pub async fn on_page_ready(&self, page: &mut dyn Page) {
        info!("Page ready, loading catalog");
        let loads = async {
            self.load_all_films(page).await;
            self.load_recommendations(page).await;
        };
        futures::join!(loads, self.check_session());
    }

    pub async fn dispatch(&self, page: &mut dyn Page, event: UiEvent) {
        match event {
            UiEvent::PageReady => self.on_page_ready(page).await,
            UiEvent::Dom { element, kind } => match listener_for(element, kind) {
                Some(Handler::Search) => {
                    let query = page.value(element);
                    self.search_films(page, &query).await;
                }
                Some(Handler::ToggleMobileMenu) => self.toggle_mobile_menu(page),
                None => debug!("No listener for {:?} on {}", kind, element.as_str()),
            },
            UiEvent::CategorySelected(category) => {
                self.load_films_by_category(page, &category).await
            }
            UiEvent::PlayClicked(film_id) => self.play_film(page, film_id).await,
            UiEvent::FavoriteClicked(film_id) => self.add_to_favorites(page, film_id).await,
            UiEvent::NewsletterSubmitted => self.subscribe_newsletter(page).await,
            UiEvent::RetryClicked => self.load_all_films(page).await,
            UiEvent::MobileSearchToggled => self.toggle_mobile_search(page),
        }
    }
}
