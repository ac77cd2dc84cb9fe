/*
 * Responsibility
 * - Response DTO for the owner profile route
 */
use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::Claims;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub owner: Uuid,
    pub scope: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ProfileResponse {
    pub fn from_claims(owner: Uuid, claims: &Claims) -> Self {
        Self {
            owner,
            scope: claims.scope.tokens().to_vec(),
            tags: claims
                .tags_in_scope()
                .iter()
                .map(|t| t.payload().to_string())
                .collect(),
            client_id: Some(claims.client_id.clone()).filter(|s| !s.is_empty()),
            email: Some(claims.email.clone()).filter(|s| !s.is_empty()),
            expires_at: claims.expires_at_time().map(|t| t.to_rfc3339()),
        }
    }
}
