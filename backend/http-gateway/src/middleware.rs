//! Cross-origin policy
//!
//! Browser clients are served from anywhere, so any origin is accepted. Only
//! the methods and headers the REST routes actually use are allowed.

use actix_cors::Cors;
use actix_web::http::header;

pub const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

/// Build actix-cors middleware for the gateway
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(ALLOWED_METHODS.iter().copied())
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT_ENCODING,
            header::ACCEPT,
        ])
}
