//! Request logging middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Log method, path and status of every request
///
/// Email addresses only travel in bodies, so the path is safe to log as is.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();
    if status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), duration_ms = %duration_ms, "Auth request failed");
    } else {
        info!(method = %method, path = %path, status = status.as_u16(), duration_ms = %duration_ms, "Auth request");
    }

    response
}
