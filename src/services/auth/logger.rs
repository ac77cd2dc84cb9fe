//! Logging collaborator for the authenticator.
//!
//! Three event classes: user authentication failures, generic info, generic
//! errors. Each call carries the request's [`TraceContext`].

use std::error::Error as StdError;

use axum::http::{HeaderName, request::Parts};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request-scoped correlation data for log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    pub request_id: Option<String>,
    pub method: String,
    pub path: String,
}

impl TraceContext {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            request_id: parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
        }
    }
}

pub trait AuthLogger: Send + Sync {
    fn user_auth_failure(&self, ctx: &TraceContext, err: &(dyn StdError + 'static));
    fn info(&self, ctx: &TraceContext, message: &str);
    fn error(&self, ctx: &TraceContext, err: &(dyn StdError + 'static));
}

/// Default logger backed by `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl AuthLogger for TracingLogger {
    fn user_auth_failure(&self, ctx: &TraceContext, err: &(dyn StdError + 'static)) {
        tracing::warn!(
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %ctx.method,
            path = %ctx.path,
            error = %err,
            "user authentication failed"
        );
    }

    fn info(&self, ctx: &TraceContext, message: &str) {
        tracing::info!(
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %ctx.method,
            path = %ctx.path,
            "{message}"
        );
    }

    fn error(&self, ctx: &TraceContext, err: &(dyn StdError + 'static)) {
        tracing::error!(
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %ctx.method,
            path = %ctx.path,
            error = %err,
            "authentication error"
        );
    }
}
