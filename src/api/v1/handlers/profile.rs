/*
 * Responsibility
 * - GET /users/{owner}/profile
 * - Guarded by Verify (owner == sub, user:r); the handler only shapes output
 */
use axum::{Json, extract::Path};
use uuid::Uuid;

use crate::api::v1::dto::profile::ProfileResponse;
use crate::api::v1::extractors::VerifiedClaims;
use crate::error::AppError;

pub async fn get_profile(
    Path(owner): Path<String>,
    VerifiedClaims(claims): VerifiedClaims,
) -> Result<Json<ProfileResponse>, AppError> {
    let owner = Uuid::parse_str(&owner)
        .map_err(|_| AppError::bad_request("INVALID_OWNER", "owner must be a uuid"))?;
    Ok(Json(ProfileResponse::from_claims(owner, &claims)))
}
