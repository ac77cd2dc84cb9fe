use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Claims;

use super::RequestIdentity;

/// Claims placed by the Verify / Extract middleware.
/// Absent means the route is not guarded (or Extract found nothing): 401.
pub struct VerifiedClaims(pub Claims);

impl<S> FromRequestParts<S> for VerifiedClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(VerifiedClaims)
            .ok_or(AppError::Unauthorized)
    }
}

/// Request identity; empty when nothing has been established.
pub struct Identity(pub RequestIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(
            parts
                .extensions
                .get::<RequestIdentity>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
