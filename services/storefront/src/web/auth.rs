//! services/storefront/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout. They act on the
//! visitor's storefront, so a login here is what later favorites are written as.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use cinema_core::{PortError, StorefrontError, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::{AppState, Visitor};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// False when the backend waits for e-mail confirmation before signing in.
    pub signed_in: bool,
}

impl AuthResponse {
    fn new(user: User, signed_in: bool) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            signed_in,
        }
    }
}

/// Maps an auth failure onto an HTTP status. The core has already logged it.
fn auth_failure(e: StorefrontError) -> (StatusCode, String) {
    match e {
        StorefrontError::Auth(PortError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
        }
        StorefrontError::Auth(PortError::Rejected(message)) => (StatusCode::BAD_REQUEST, message),
        other => (StatusCode::BAD_GATEWAY, other.to_string()),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Rejected by the auth endpoint"),
        (status = 502, description = "Auth endpoint unavailable")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let storefront = state.storefront(visitor).await;
    let registration = storefront
        .register_user(&req.email, &req.password)
        .await
        .map_err(auth_failure)?;

    let signed_in = registration.session.is_some();
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(registration.user, signed_in)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Auth endpoint unavailable")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let storefront = state.storefront(visitor).await;
    let user = storefront
        .login_user(&req.email, &req.password)
        .await
        .map_err(auth_failure)?;

    Ok((StatusCode::OK, Json(AuthResponse::new(user, true))))
}

/// POST /auth/logout - End the visitor's session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
) -> StatusCode {
    if let Some(storefront) = state.existing_storefront(visitor).await {
        storefront.logout_user().await;
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_statuses() {
        let (status, _) = auth_failure(StorefrontError::Auth(PortError::Unauthorized));
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = auth_failure(StorefrontError::Auth(PortError::Rejected(
            "Invalid login credentials".to_string(),
        )));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid login credentials");

        let (status, _) = auth_failure(StorefrontError::Auth(PortError::Unexpected(
            "timeout".to_string(),
        )));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
