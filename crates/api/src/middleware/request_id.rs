//! Request ID middleware for correlating logs, Sentry events and responses.
//!
//! The gateway in front of the service usually assigns an `x-request-id`. When
//! it is missing, empty or implausibly long a UUID v4 is generated instead.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream request ID that is passed through unchanged.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request carries a request ID.
///
/// The ID is recorded in the current span, set as a Sentry tag, written back
/// into the request headers and echoed in the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .cloned()
        .unwrap_or_else(generate);

    if let Ok(id) = request_id.to_str() {
        Span::current().record("request_id", id);
        sentry::configure_scope(|scope| scope.set_tag("request_id", id));
    }
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), request_id.clone());

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), request_id);
    response
}

fn generate() -> HeaderValue {
    // hyphenated UUIDs are always valid header values
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}
