//! Shoplist API library.
//!
//! The REST service for shared shopping lists as a library, so the router can
//! be driven directly by tests and by the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, header},
    middleware::from_fn,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::identity::{AUTHORITIES_HEADER, IDENTITY_HEADER};
use crate::middleware::request_id::REQUEST_ID_HEADER;
use crate::state::AppState;

/// Build the application router without rate limiting.
pub fn app(state: AppState) -> Router {
    assemble(routes::api_routes(), state)
}

/// Build the application router with per-client rate limiting on `/api`.
pub fn app_with_rate_limit(state: AppState) -> Router {
    assemble(
        routes::api_routes().layer(middleware::api_rate_limiter()),
        state,
    )
}

fn assemble(api: Router<AppState>, state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .merge(routes::health_routes())
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                identity = tracing::field::Empty,
            )
        }))
}

/// CORS for the front end. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(IDENTITY_HEADER),
            HeaderName::from_static(AUTHORITIES_HEADER),
            REQUEST_ID_HEADER.clone(),
        ])
        .expose_headers([REQUEST_ID_HEADER.clone()])
}
