//! services/storefront/src/web/rest.rs
//!
//! Contains the Axum handlers for the JSON endpoints and the master definition
//! for the OpenAPI specification.

use crate::web::{
    auth::{AuthResponse, CredentialsRequest},
    protocol::{ClientEvent, EventRequest, PagePatch, PatchOp},
    state::{AppState, Visitor},
};
use axum::{extract::State, response::Json, Extension};
use cinema_core::Film;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::events::event_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        favorites_handler,
    ),
    components(
        schemas(
            EventRequest, ClientEvent, PagePatch, PatchOp,
            CredentialsRequest, AuthResponse, FilmResponse
        )
    ),
    tags(
        (name = "Cinema Storefront API", description = "Catalog, favorites and newsletter endpoints for the storefront page.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct FilmResponse {
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub description: Option<String>,
}

impl From<Film> for FilmResponse {
    fn from(film: Film) -> Self {
        Self {
            id: film.id,
            title: film.title,
            genre: film.genre,
            release_year: film.release_year,
            rating: film.rating,
            poster_url: film.poster_url,
            video_url: film.video_url,
            description: film.description,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// The signed-in visitor's favorite films.
///
/// Empty when nobody is signed in or the favorites cannot be read.
#[utoipa::path(
    get,
    path = "/favorites",
    responses(
        (status = 200, description = "Favorite films", body = [FilmResponse])
    )
)]
pub async fn favorites_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
) -> Json<Vec<FilmResponse>> {
    let films = match state.existing_storefront(visitor).await {
        Some(storefront) => storefront.get_favorites().await,
        None => Vec::new(),
    };
    Json(films.into_iter().map(FilmResponse::from).collect())
}
