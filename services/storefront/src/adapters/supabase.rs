//! services/storefront/src/adapters/supabase.rs
//!
//! This module contains the backend adapter, the concrete implementation of the
//! `CatalogService` and `AuthService` ports from the `core` crate. It talks to a
//! hosted Supabase project over HTTPS: PostgREST for the collections and GoTrue
//! for authentication.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinema_core::domain::{
    AuthSession, Favorite, Film, NewsletterSubscription, Registration, User,
};
use cinema_core::ports::{AuthService, CatalogService, PortError, PortResult};
use cinema_core::query::{FilmQuery, Filter};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter for a hosted Supabase project.
#[derive(Clone)]
pub struct SupabaseAdapter {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAdapter {
    /// Creates a new `SupabaseAdapter`. `base_url` must not end with a slash.
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Every request carries the project key; the bearer is the user's token
    /// when there is one, so row-level security sees the right role.
    fn request(&self, method: Method, url: String, access_token: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    async fn send(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        check_status(response).await
    }
}

/// Turns a non-success response into a `PortError`, keeping the backend's message.
async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> PortError {
    let message = error_message(body).unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        s if s.is_client_error() => PortError::Rejected(message),
        _ => PortError::Unexpected(message),
    }
}

/// PostgREST and GoTrue report errors under different keys.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
}

//=========================================================================================
// PostgREST Query Translation
//=========================================================================================

/// Query-string parameters for a `films` read.
pub fn film_query_params(query: &FilmQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];
    match &query.filter {
        Some(Filter::Contains(column, needle)) => {
            params.push((column.as_str(), format!("ilike.*{}*", needle)));
        }
        Some(Filter::AtLeast(column, value)) => {
            params.push((column.as_str(), format!("gte.{}", value)));
        }
        None => {}
    }
    let direction = if query.order.descending { "desc" } else { "asc" };
    // Unrated films go last. A bare `desc` would put nulls first.
    params.push((
        "order",
        format!("{}.{}.nullslast", query.order.column.as_str(), direction),
    ));
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct FilmRecord {
    id: i64,
    title: String,
    genre: Option<String>,
    release_year: Option<i32>,
    rating: Option<f64>,
    poster_url: Option<String>,
    video_url: Option<String>,
    description: Option<String>,
}
impl FilmRecord {
    fn to_domain(self) -> Film {
        Film {
            id: self.id,
            title: self.title,
            genre: self.genre,
            release_year: self.release_year,
            rating: self.rating,
            poster_url: self.poster_url,
            video_url: self.video_url,
            description: self.description,
        }
    }
}

/// A `favorites` row with its film embedded through the foreign key.
#[derive(Deserialize)]
struct FavoriteRecord {
    films: Option<FilmRecord>,
}

#[derive(Serialize)]
struct FavoriteInsert {
    user_id: Uuid,
    film_id: i64,
}

#[derive(Serialize)]
struct SubscriptionInsert<'a> {
    email: &'a str,
    subscribed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UserRecord {
    id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
struct SessionRecord {
    access_token: String,
    user: UserRecord,
}
impl SessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            user: self.user.to_domain(),
            access_token: self.access_token,
        }
    }
}

/// Sign-up answers with a full session when e-mail confirmation is off, and
/// with the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpRecord {
    Session(SessionRecord),
    User(UserRecord),
}
impl SignUpRecord {
    fn to_domain(self) -> Registration {
        match self {
            SignUpRecord::Session(session) => {
                let session = session.to_domain();
                Registration {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpRecord::User(user) => Registration {
                user: user.to_domain(),
                session: None,
            },
        }
    }
}

fn decode_error(e: reqwest::Error) -> PortError {
    PortError::Unexpected(format!("Malformed response: {}", e))
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for SupabaseAdapter {
    async fn select_films(
        &self,
        query: &FilmQuery,
        session: Option<&AuthSession>,
    ) -> PortResult<Vec<Film>> {
        let params = film_query_params(query);
        debug!("Selecting films with {:?}", params);
        let token = session.map(|s| s.access_token.as_str());
        let request = self
            .request(Method::GET, self.rest_url("films"), token)
            .query(&params);

        let records: Vec<FilmRecord> = self.send(request).await?.json().await.map_err(decode_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_favorite(&self, favorite: Favorite, session: &AuthSession) -> PortResult<()> {
        let row = FavoriteInsert {
            user_id: favorite.user_id,
            film_id: favorite.film_id,
        };
        let request = self
            .request(Method::POST, self.rest_url("favorites"), Some(&session.access_token))
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send(request).await?;
        Ok(())
    }

    async fn favorite_films(&self, session: &AuthSession) -> PortResult<Vec<Film>> {
        let request = self
            .request(Method::GET, self.rest_url("favorites"), Some(&session.access_token))
            .query(&[
                ("select", "film_id,films(*)".to_string()),
                ("user_id", format!("eq.{}", session.user.id)),
            ]);

        let records: Vec<FavoriteRecord> =
            self.send(request).await?.json().await.map_err(decode_error)?;
        Ok(records
            .into_iter()
            .filter_map(|r| r.films)
            .map(|f| f.to_domain())
            .collect())
    }

    async fn insert_subscription(
        &self,
        subscription: NewsletterSubscription,
        session: Option<&AuthSession>,
    ) -> PortResult<()> {
        let row = SubscriptionInsert {
            email: &subscription.email,
            subscribed_at: subscription.subscribed_at,
        };
        let token = session.map(|s| s.access_token.as_str());
        let request = self
            .request(Method::POST, self.rest_url("newsletter"), token)
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send(request).await?;
        Ok(())
    }
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for SupabaseAdapter {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<Registration> {
        let request = self
            .request(Method::POST, self.auth_url("signup"), None)
            .json(&Credentials { email, password });
        let record: SignUpRecord = self.send(request).await?.json().await.map_err(decode_error)?;
        Ok(record.to_domain())
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let request = self
            .request(Method::POST, self.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });
        // Bad credentials come back as 400 invalid_grant, i.e. `Rejected`.
        let record: SessionRecord = self.send(request).await?.json().await.map_err(decode_error)?;
        Ok(record.to_domain())
    }

    async fn sign_out(&self, session: &AuthSession) -> PortResult<()> {
        let request = self.request(
            Method::POST,
            self.auth_url("logout"),
            Some(&session.access_token),
        );
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> PortResult<Option<User>> {
        let request = self.request(Method::GET, self.auth_url("user"), Some(access_token));
        match self.send(request).await {
            Ok(response) => {
                let record: UserRecord = response.json().await.map_err(decode_error)?;
                Ok(Some(record.to_domain()))
            }
            Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
