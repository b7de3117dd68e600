//! crates/cinema_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of the backend's wire format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Primary key of a row in the `films` collection.
pub type FilmId = i64;

/// A single film record as held in a query snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub description: Option<String>,
}

impl Film {
    /// The rating badge text: one decimal place, or `N/A` when the film is unrated.
    /// Halves round away from zero, so 8.25 reads "8.3".
    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", (rating * 10.0).round() / 10.0),
            None => RATING_PLACEHOLDER.to_string(),
        }
    }
}

pub const RATING_PLACEHOLDER: &str = "N/A";

// Represents the signed-in user returned by the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An authenticated session: the user plus the bearer token the backend issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
}

/// Result of a sign-up. The backend withholds the session until the
/// address is confirmed, so it may be absent.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub session: Option<AuthSession>,
}

/// A (user, film) association in the `favorites` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub user_id: Uuid,
    pub film_id: FilmId,
}

/// A row written to the `newsletter` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterSubscription {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(rating: Option<f64>) -> Film {
        Film {
            id: 1,
            title: "Солярис".to_string(),
            genre: None,
            release_year: None,
            rating,
            poster_url: None,
            video_url: None,
            description: None,
        }
    }

    #[test]
    fn rating_label_uses_one_decimal() {
        assert_eq!(film(Some(8.0)).rating_label(), "8.0");
        assert_eq!(film(Some(7.46)).rating_label(), "7.5");
        assert_eq!(film(Some(9.04)).rating_label(), "9.0");
        assert_eq!(film(Some(0.0)).rating_label(), "0.0");
    }

    #[test]
    fn rating_label_rounds_halves_up() {
        assert_eq!(film(Some(8.25)).rating_label(), "8.3");
        assert_eq!(film(Some(7.25)).rating_label(), "7.3");
    }

    #[test]
    fn rating_label_falls_back_to_placeholder() {
        assert_eq!(film(None).rating_label(), "N/A");
    }
}
