//! services/storefront/src/web/middleware.rs
//!
//! Visitor middleware: ties every request to a page session.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::web::state::Visitor;

pub const VISITOR_COOKIE: &str = "visitor";
const VISITOR_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Reads the visitor id from the `visitor` cookie, if present and well-formed.
pub fn visitor_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("visitor="))
        .and_then(|id| Uuid::parse_str(id).ok())
}

pub fn visitor_cookie(visitor_id: Uuid) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        VISITOR_COOKIE, visitor_id, VISITOR_MAX_AGE_SECS
    )
}

/// Middleware that resolves the visitor behind a request.
///
/// Known visitors are taken from their cookie. New ones get a fresh id, which is
/// set as a cookie on the response. The id is inserted into request extensions.
pub async fn assign_visitor(mut req: Request, next: Next) -> Response {
    // 1. Look for an existing visitor cookie
    let existing = visitor_from_headers(req.headers());
    let visitor_id = existing.unwrap_or_else(Uuid::new_v4);
    if existing.is_none() {
        debug!("New visitor {}", visitor_id);
    }

    // 2. Insert the visitor into request extensions
    req.extensions_mut().insert(Visitor(visitor_id));

    // 3. Continue to the handler
    let mut response = next.run(req).await;

    // 4. Hand the id to browsers that did not have one
    if existing.is_none() {
        match HeaderValue::from_str(&visitor_cookie(visitor_id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build visitor cookie: {:?}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn visitor_cookie_is_found_among_others() {
        let id = Uuid::new_v4();
        let found = visitor_from_headers(&headers(&format!("theme=dark; visitor={}; lang=ru", id)));
        assert_eq!(found, Some(id));
    }

    #[test]
    fn missing_or_malformed_cookie_yields_none() {
        assert_eq!(visitor_from_headers(&HeaderMap::new()), None);
        assert_eq!(visitor_from_headers(&headers("visitor=not-a-uuid")), None);
        assert_eq!(visitor_from_headers(&headers("session=abc")), None);
    }

    #[test]
    fn issued_cookie_round_trips() {
        let id = Uuid::new_v4();
        let cookie = visitor_cookie(id);
        assert!(cookie.starts_with(&format!("visitor={};", id)));
        assert!(cookie.contains("HttpOnly"));
        let pair = cookie.split(';').next().unwrap();
        assert_eq!(visitor_from_headers(&headers(pair)), Some(id));
    }
}
