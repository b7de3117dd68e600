pub mod domain;
pub mod error;
pub mod page;
pub mod ports;
pub mod query;
pub mod storefront;
pub mod view;
pub mod wiring;

#[cfg(test)]
mod testing;

pub use domain::{AuthSession, Favorite, Film, FilmId, NewsletterSubscription, Registration, User};
pub use error::{StorefrontError, StorefrontResult};
pub use page::{DomOp, ElementId, Page, PageModel};
pub use ports::{AuthService, CatalogService, PortError, PortResult};
pub use query::{FilmColumn, FilmQuery, Filter, FilterValue};
pub use storefront::Storefront;
pub use wiring::{EventKind, UiEvent};
