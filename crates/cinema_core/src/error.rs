//! crates/cinema_core/src/error.rs
//!
//! Error taxonomy for storefront operations.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// A remote read or write against a collection failed.
    #[error("Query failed: {0}")]
    Query(#[source] PortError),

    /// The authentication endpoint refused or failed the request.
    #[error("Authentication failed: {0}")]
    Auth(#[source] PortError),

    /// A required form field was empty. Raised before any remote call.
    #[error("Validation failed: {0}")]
    Validation(&'static str),

    /// The operation needs a signed-in user.
    #[error("No active session")]
    SignedOut,
}

pub type StorefrontResult<T> = Result<T, StorefrontError>;
