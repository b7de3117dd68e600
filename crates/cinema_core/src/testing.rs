//! In-memory port implementations for the core's tests.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::{AuthSession, Favorite, Film, NewsletterSubscription, Registration, User};
use crate::ports::{AuthService, CatalogService, PortError, PortResult};
use crate::query::{FilmColumn, FilmQuery, Filter, FilterValue};

pub fn film(
    id: i64,
    title: &str,
    rating: Option<f64>,
    release_year: Option<i32>,
    genre: Option<&str>,
) -> Film {
    Film {
        id,
        title: title.to_string(),
        genre: genre.map(str::to_string),
        release_year,
        rating,
        poster_url: None,
        video_url: None,
        description: None,
    }
}

fn numeric(film: &Film, column: FilmColumn) -> Option<f64> {
    match column {
        FilmColumn::Rating => film.rating,
        FilmColumn::ReleaseYear => film.release_year.map(f64::from),
        FilmColumn::Title | FilmColumn::Genre => None,
    }
}

fn textual(film: &Film, column: FilmColumn) -> Option<&str> {
    match column {
        FilmColumn::Title => Some(film.title.as_str()),
        FilmColumn::Genre => film.genre.as_deref(),
        FilmColumn::ReleaseYear | FilmColumn::Rating => None,
    }
}

fn matches(filter: &Filter, film: &Film) -> bool {
    match filter {
        Filter::Contains(column, needle) => textual(film, *column)
            .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
        Filter::AtLeast(column, value) => {
            let min = match value {
                FilterValue::Int(v) => *v as f64,
                FilterValue::Float(v) => *v,
            };
            numeric(film, *column).is_some_and(|v| v >= min)
        }
    }
}

/// Evaluates a query the way the backend does, nulls sorted last.
fn run(query: &FilmQuery, films: &[Film]) -> Vec<Film> {
    let mut out: Vec<Film> = films
        .iter()
        .filter(|f| query.filter.as_ref().map_or(true, |filter| matches(filter, f)))
        .cloned()
        .collect();
    let column = query.order.column;
    out.sort_by(|a, b| match (numeric(a, column), numeric(b, column)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal);
            if query.order.descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    });
    if let Some(limit) = query.limit {
        out.truncate(limit);
    }
    out
}

/// Gate key for the full catalog read.
pub const FULL_CATALOG: &str = "*";

#[derive(Default)]
pub struct InMemoryCatalog {
    films: Vec<Film>,
    favorites: Mutex<Vec<Favorite>>,
    subscriptions: Mutex<Vec<NewsletterSubscription>>,
    queries: Mutex<Vec<FilmQuery>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new(films: Vec<Film>) -> Self {
        Self {
            films,
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Holds title searches for `needle` until the returned handle is notified.
    /// [`FULL_CATALOG`] holds the unfiltered, unlimited catalog read instead.
    pub fn gate(&self, needle: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(needle.to_string(), notify.clone());
        notify
    }

    pub fn queries(&self) -> Vec<FilmQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        self.favorites.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<NewsletterSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    fn check_write(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("write refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn select_films(
        &self,
        query: &FilmQuery,
        _session: Option<&AuthSession>,
    ) -> PortResult<Vec<Film>> {
        self.queries.lock().unwrap().push(query.clone());
        let key = match &query.filter {
            Some(Filter::Contains(FilmColumn::Title, needle)) => Some(needle.as_str()),
            None if query.limit.is_none() => Some(FULL_CATALOG),
            _ => None,
        };
        let gate = key.and_then(|key| self.gates.lock().unwrap().get(key).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection reset".to_string()));
        }
        Ok(run(query, &self.films))
    }

    async fn insert_favorite(&self, favorite: Favorite, _session: &AuthSession) -> PortResult<()> {
        self.check_write()?;
        self.favorites.lock().unwrap().push(favorite);
        Ok(())
    }

    async fn favorite_films(&self, session: &AuthSession) -> PortResult<Vec<Film>> {
        let ids: Vec<i64> = self
            .favorites
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.user_id == session.user.id)
            .map(|f| f.film_id)
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| self.films.iter().find(|f| f.id == *id).cloned())
            .collect())
    }

    async fn insert_subscription(
        &self,
        subscription: NewsletterSubscription,
        _session: Option<&AuthSession>,
    ) -> PortResult<()> {
        self.check_write()?;
        self.subscriptions.lock().unwrap().push(subscription);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuth {
    accounts: Mutex<HashMap<String, (Uuid, String)>>,
    tokens: Mutex<HashSet<String>>,
    fail_sign_out: AtomicBool,
}

impl FakeAuth {
    pub fn with_account(email: &str, password: &str) -> Self {
        let auth = Self::default();
        auth.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (Uuid::new_v4(), password.to_string()));
        auth
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn revoke_all(&self) {
        self.tokens.lock().unwrap().clear();
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<Registration> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(PortError::Rejected("User already registered".to_string()));
        }
        let id = Uuid::new_v4();
        accounts.insert(email.to_string(), (id, password.to_string()));
        Ok(Registration {
            user: User {
                id,
                email: Some(email.to_string()),
            },
            session: None,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((id, stored)) if stored == password => {
                let token = format!("token-{}", id);
                self.tokens.lock().unwrap().insert(token.clone());
                Ok(AuthSession {
                    user: User {
                        id: *id,
                        email: Some(email.to_string()),
                    },
                    access_token: token,
                })
            }
            _ => Err(PortError::Rejected("Invalid login credentials".to_string())),
        }
    }

    async fn sign_out(&self, session: &AuthSession) -> PortResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("sign-out unavailable".to_string()));
        }
        self.tokens.lock().unwrap().remove(&session.access_token);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> PortResult<Option<User>> {
        if !self.tokens.lock().unwrap().contains(access_token) {
            return Ok(None);
        }
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|(_, (id, _))| format!("token-{}", id) == access_token)
            .map(|(email, (id, _))| User {
                id: *id,
                email: Some(email.clone()),
            }))
    }
}
