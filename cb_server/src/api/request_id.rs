//! Request ID middleware for tracing and debugging.
//!
//! Every request runs inside a `request` span carrying its id, so log lines
//! emitted by handlers and managers correlate without passing the id around.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::metrics;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is accepted as is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Generate or extract request ID from headers
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware to add request ID to all requests and responses
///
/// This middleware:
/// 1. Extracts existing request ID from header or generates a new one
/// 2. Runs the request inside a span carrying the ID
/// 3. Adds request ID to response headers and counts the response
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use cb_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = get_or_generate_request_id(request.headers());
    let method = request.method().clone();

    let span = tracing::info_span!("request", request_id = %request_id);

    async move {
        tracing::info!(method = %method, uri = %request.uri().path(), "Request started");

        let response = next.run(request).await;

        let (mut parts, body) = response.into_parts();
        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            parts.headers.insert(REQUEST_ID_HEADER, header_value);
        }

        metrics::http_requests_total(method.as_str(), parts.status.as_u16());
        tracing::info!(status = %parts.status, "Request completed");

        Response::from_parts(parts, body)
    }
    .instrument(span)
    .await
}
