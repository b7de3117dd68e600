//! services/storefront/src/web/events.rs
//!
//! The event endpoint: runs one page event through the visitor's storefront
//! and returns the resulting DOM writes.

use crate::web::{
    protocol::{EventRequest, PagePatch},
    state::{AppState, Visitor},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle one page event.
#[utoipa::path(
    post,
    path = "/events",
    request_body = EventRequest,
    responses(
        (status = 200, description = "DOM writes to apply, in order", body = PagePatch),
        (status = 400, description = "Unknown event target")
    )
)]
pub async fn event_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Json(req): Json<EventRequest>,
) -> Result<Json<PagePatch>, (StatusCode, String)> {
    let (event, mut page) = req.into_parts().map_err(|e| {
        warn!("Rejected event from visitor {}: {}", visitor.0, e);
        (StatusCode::BAD_REQUEST, e)
    })?;
    debug!("Visitor {} event {:?}", visitor.0, event);

    let storefront = state.storefront(visitor).await;
    storefront.dispatch(&mut page, event).await;

    Ok(Json(PagePatch::from(page)))
}
