//! Composable request middleware.
//!
//! [`Middleware`] values are applied to a router with [`apply_middlewares`];
//! the first entry in the list is the outermost layer and sees the request
//! first. [`request_logging_middleware`] is the structured per-request log
//! that the server installs globally.

use std::any::Any;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::ServerError;
use crate::state::AppState;

/// Response header carrying the handler time measured by [`Middleware::Metric`].
pub const RESPONSE_TIME_HEADER: &str = "x-response-time-ms";

/// A request middleware that can be stacked with [`apply_middlewares`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Middleware {
    /// Turn a panicking handler into a `500` response instead of a dropped connection.
    PanicRecover,
    /// Log when processing of a path starts and ends.
    Logger,
    /// Measure handler time; logged and returned in [`RESPONSE_TIME_HEADER`].
    Metric,
}

/// The full chain: recovery outermost, then logging, then timing.
pub const DEFAULT_CHAIN: [Middleware; 3] = [
    Middleware::PanicRecover,
    Middleware::Logger,
    Middleware::Metric,
];

impl Middleware {
    /// Wrap every route currently on `router` with this middleware.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match self {
            Middleware::PanicRecover => router.layer(CatchPanicLayer::custom(panic_response)),
            Middleware::Logger => router.layer(middleware::from_fn(with_logger)),
            Middleware::Metric => router.layer(middleware::from_fn(metric)),
        }
    }
}

/// Wrap `router` in `middlewares`, first entry outermost.
pub fn apply_middlewares<S>(router: Router<S>, middlewares: &[Middleware]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // The last layer added runs first, so add them innermost-first.
    middlewares
        .iter()
        .rev()
        .fold(router, |router, m| m.apply(router))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");

    ServerError::Internal("request handler panicked".to_string()).into_response()
}

async fn with_logger(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();

    tracing::info!(path = %path, "Processing started");
    let response = next.run(request).await;
    tracing::info!(path = %path, status = response.status().as_u16(), "Processing finished");

    response
}

async fn metric(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let elapsed = start.elapsed();
    tracing::info!(
        path = %path,
        elapsed_secs = elapsed.as_secs_f64(),
        "Request timed"
    );
    response.headers_mut().insert(
        HeaderName::from_static(RESPONSE_TIME_HEADER),
        HeaderValue::from(elapsed.as_millis() as u64),
    );

    response
}

/// Structured request logging middleware.
///
/// Logs request details including method, path, status, and duration.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}
