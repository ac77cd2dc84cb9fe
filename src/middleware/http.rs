//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id); the auth logger
//!   reads the same header for correlation
//! - Access logging / request tracing (TraceLayer)
//! - Body size limits
//! - Global timeouts

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit: usize,
    pub timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit: 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Apply HTTP-level middleware to the given Router.
pub fn apply<S>(router: Router<S>, limits: HttpLimits) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        // Set before tracing so the span and the auth logger see the same id
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(limits.body_limit))
        .layer(TimeoutLayer::new(limits.timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
