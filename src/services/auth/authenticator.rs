/*
 * Responsibility
 * - Compose extraction -> verification -> authorization
 * - Map request-path failures to an HTTP status and a logger call
 *
 * Notes
 * - The HTTP wiring (Verify / Extract middleware) lives in middleware::auth
 */
use std::{fmt, sync::Arc};

use axum::http::StatusCode;
use thiserror::Error;

use super::claims::Claims;
use super::extractor::{ExtractError, ExtractorConfig, TokenExtractor, TokenRequest};
use super::logger::{AuthLogger, TraceContext, TracingLogger};
use super::rules::{Rule, RuleError, RuleRequest, evaluate_all};
use super::verifier::{TokenVerifier, VerifyError};
use crate::services::keys::KeyProvider;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl AuthError {
    /// Status presented to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Verify(VerifyError::Keys(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Verify(VerifyError::MalformedClaims(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

pub struct Authenticator {
    verifier: TokenVerifier,
    extractor: TokenExtractor,
    logger: Arc<dyn AuthLogger>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("verifier", &self.verifier)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(keys: Arc<dyn KeyProvider>, config: &ExtractorConfig) -> Self {
        Self {
            verifier: TokenVerifier::new(keys),
            extractor: TokenExtractor::new(config),
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn AuthLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    pub fn logger(&self) -> &dyn AuthLogger {
        self.logger.as_ref()
    }

    /// Extracts and verifies the request's token.
    pub fn authenticate(&self, req: &TokenRequest<'_>) -> Result<Claims, AuthError> {
        let extracted = self.extractor.extract(req)?;
        tracing::debug!(location = ?extracted.location, "access token extracted");
        Ok(self.verifier.verify(&extracted.token)?)
    }

    pub fn authorize(
        &self,
        rules: &[Rule],
        req: &RuleRequest<'_>,
        claims: &Claims,
    ) -> Result<(), AuthError> {
        Ok(evaluate_all(rules, req, claims)?)
    }

    /// Routes a failure to the matching logger class.
    pub fn report(&self, ctx: &TraceContext, err: &AuthError) {
        match err {
            AuthError::Verify(VerifyError::Keys(_)) => self.logger.error(ctx, err),
            _ => self.logger.user_auth_failure(ctx, err),
        }
    }
}
