/*
 * Responsibility
 * - Sign access tokens with the active signing key (RS256)
 * - Fill the time window with a fixed clock skew on both ends
 */
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use super::claims::{Claims, ISSUER};
use super::owner::Owner;
use super::scope::Scope;
use crate::services::keys::{CredentialStore, KeyStoreError, SigningKey};

/// Tolerated clock difference between issuer and verifiers.
pub const CLOCK_SKEW: TimeDelta = TimeDelta::minutes(1);

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign access token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct AccessTokenOptions {
    subject: Uuid,
    validity: TimeDelta,
    scope: Scope,
    user_id: Uuid,
    app_id: Uuid,
    client_id: String,
    tenant_id: String,
    email: String,
    issued_at: Option<DateTime<Utc>>,
}

impl AccessTokenOptions {
    pub fn new(subject: Uuid, validity: TimeDelta) -> Self {
        Self {
            subject,
            validity,
            scope: Scope::default(),
            user_id: Uuid::nil(),
            app_id: Uuid::nil(),
            client_id: String::new(),
            tenant_id: String::new(),
            email: String::new(),
            issued_at: None,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn user_id(mut self, id: Uuid) -> Self {
        self.user_id = id;
        self
    }

    pub fn app_id(mut self, id: Uuid) -> Self {
        self.app_id = id;
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    pub fn tenant_id(mut self, id: impl Into<String>) -> Self {
        self.tenant_id = id.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Pins the issue time instead of reading the clock.
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    fn into_claims(self) -> Claims {
        let now = self.issued_at.unwrap_or_else(Utc::now);
        Claims {
            subject: Owner::new(self.subject),
            issuer: ISSUER.to_string(),
            expires_at: Some((now + self.validity + CLOCK_SKEW).timestamp()),
            not_before: Some((now - CLOCK_SKEW).timestamp()),
            issued_at: Some(now.timestamp()),
            jwt_id: Uuid::new_v4(),
            app_id: self.app_id,
            client_id: self.client_id,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
            scope: self.scope,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
}

impl TokenIssuer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Issuer bound to the store's currently active signing key.
    pub fn from_store(store: &CredentialStore) -> Result<Self, KeyStoreError> {
        store.signing_key().map(Self::new)
    }

    pub fn key_name(&self) -> &str {
        &self.key.name
    }

    pub fn issue(&self, options: AccessTokenOptions) -> Result<AccessToken, IssueError> {
        let access_token = self.sign(&options.into_claims())?;
        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, IssueError> {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = Some(self.key.name.clone());

        jsonwebtoken::encode(&header, claims, self.key.encoding_key()).map_err(|e| {
            error!(error = %e, key = %self.key.name, "failed to sign access token");
            IssueError::Sign(e)
        })
    }
}
