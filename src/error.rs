/*
 * Responsibility
 * - App-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Convert auth and ticket failures without leaking their details
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::{AuthError, TicketError, VerifyError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".into(),
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{resource} not found."),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            // Store failures are ours, not the caller's
            AuthError::Verify(VerifyError::Keys(_)) => AppError::Internal,
            AuthError::Verify(VerifyError::MalformedClaims(_)) => {
                AppError::bad_request("MALFORMED_CLAIMS", "malformed token claims")
            }
            _ => AppError::Unauthorized,
        }
    }
}

impl From<TicketError> for AppError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::EmptyKey | TicketError::Sign(_) => AppError::Internal,
            _ => AppError::Unauthorized,
        }
    }
}
