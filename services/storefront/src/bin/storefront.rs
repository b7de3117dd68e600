//! services/storefront/src/bin/storefront.rs

use storefront_lib::{
    adapters::SupabaseAdapter,
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet, so report straight to stderr.
            eprintln!("Storefront is not configured: {}", e);
            return Err(e.into());
        }
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Backend Adapter ---
    info!("Using backend at {}", config.supabase_url);
    let supabase = Arc::new(SupabaseAdapter::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        config.http_timeout,
    )?);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(supabase.clone(), supabase, &config));

    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        error!("Invalid ALLOWED_ORIGIN '{}': {}", config.allowed_origin, e);
        ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
