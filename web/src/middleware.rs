//! HTTP layers for request tracking and observability.
//!
//! [`with_http_layers`] wraps a router with, from the outside in:
//!
//! 1. **Request id**: reuse an incoming `x-request-id` or generate a UUID v4
//! 2. **Tracing**: one `http_request` span per request carrying that id
//! 3. **Propagation**: the id is copied onto the response
//! 4. **CORS**: any origin, so browser front ends can call the API
//! 5. **Body limit**: uploads above the configured size are rejected with 413
//!
//! # Example
//!
//! ```ignore
//! use ticketgate_web::middleware::with_http_layers;
//!
//! let app = with_http_layers(Router::new().route("/scan", post(scan)), 10 * 1024 * 1024);
//! ```

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::HeaderName,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap `router` with the standard HTTP layers.
///
/// `max_body_bytes` caps request bodies read by axum extractors, which
/// includes image uploads.
#[must_use]
pub fn with_http_layers<S>(router: Router<S>, max_body_bytes: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}

fn make_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}
