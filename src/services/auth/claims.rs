/*
 * Responsibility
 * - Access token payload (wire member names are fixed)
 * - Time validity check: issuer, exp, nbf
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::owner::Owner;
use super::scope::{Scope, Tag};

/// Issuer every accepted access token must carry.
pub const ISSUER: &str = "urn:ghc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("invalid issuer")]
    InvalidIssuer,
    #[error("expiration is not set")]
    ExpirationUnset,
    #[error("token is expired")]
    Expired,
    #[error("not-before is not set")]
    NotBeforeUnset,
    #[error("token is not valid yet")]
    NotValidYet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub", default)]
    pub subject: Owner,
    #[serde(rename = "iss", default)]
    pub issuer: String,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "jti", default)]
    pub jwt_id: Uuid,
    #[serde(rename = "ghc:aid", default)]
    pub app_id: Uuid,
    #[serde(rename = "ghc:cid", default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(rename = "ghc:uid", default)]
    pub user_id: Uuid,
    #[serde(rename = "ghc:tid", default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(rename = "ghc:scope", default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl Claims {
    /// Checks the claims against `now` (unix seconds).
    ///
    /// Valid iff the issuer matches, `exp > now` and `nbf <= now`.
    pub fn validate_at(&self, now: i64) -> Result<(), ClaimsError> {
        if self.issuer != ISSUER {
            return Err(ClaimsError::InvalidIssuer);
        }

        let expires_at = self.expires_at.ok_or(ClaimsError::ExpirationUnset)?;
        if now >= expires_at {
            return Err(ClaimsError::Expired);
        }

        let not_before = self.not_before.ok_or(ClaimsError::NotBeforeUnset)?;
        if not_before > now {
            return Err(ClaimsError::NotValidYet);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ClaimsError> {
        self.validate_at(Utc::now().timestamp())
    }

    /// Subject id, `None` for the nil owner.
    pub fn subject_id(&self) -> Option<Uuid> {
        (!self.subject.is_nil()).then_some(self.subject.id)
    }

    pub fn tags_in_scope(&self) -> Vec<Tag> {
        self.scope.tags()
    }

    pub fn expires_at_time(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|s| DateTime::from_timestamp(s, 0))
    }
}
