/*
 * Responsibility
 * - Declarative authorization rules checked after a token is verified
 * - Owner match (expected owner derived from the request) and scope requirements
 *
 * Notes
 * - Rules run in the order given; the first failure wins
 * - A nil expected owner never matches, so an all-zero id is not a wildcard
 */
use std::{fmt, sync::Arc};

use axum::http::{HeaderName, request::Parts};
use thiserror::Error;
use uuid::Uuid;

use super::claims::Claims;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("owner id could not be derived from the request")]
    OwnerUnavailable,
    #[error("nil owner id is never accepted")]
    NilOwner,
    #[error("owner mismatch: request is for {expected}, token subject is {actual}")]
    OwnerMismatch { expected: Uuid, actual: Uuid },
    #[error("necessary scope not in jwt: expected ALL scopes of {expected:?}, got '{actual}'")]
    MissingAllScopes { expected: Vec<String>, actual: String },
    #[error("necessary scope not in jwt: expected ANY scope of {expected:?}, got '{actual}'")]
    MissingAnyScope { expected: Vec<String>, actual: String },
}

/// What a rule can see of the request.
#[derive(Debug, Clone, Copy)]
pub struct RuleRequest<'a> {
    pub parts: &'a Parts,
    pub path_params: &'a [(String, String)],
}

impl<'a> RuleRequest<'a> {
    pub fn new(parts: &'a Parts, path_params: &'a [(String, String)]) -> Self {
        Self { parts, path_params }
    }

    pub fn path_param(&self, name: &str) -> Option<&'a str> {
        self.path_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub type OwnerFn = Arc<dyn Fn(&RuleRequest<'_>) -> Option<Uuid> + Send + Sync>;

/// Where the expected owner id comes from.
#[derive(Clone)]
pub enum OwnerSource {
    PathParam(String),
    Header(HeaderName),
    Custom(OwnerFn),
}

impl fmt::Debug for OwnerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathParam(name) => f.debug_tuple("PathParam").field(name).finish(),
            Self::Header(name) => f.debug_tuple("Header").field(name).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl OwnerSource {
    fn resolve(&self, req: &RuleRequest<'_>) -> Option<Uuid> {
        match self {
            Self::PathParam(name) => req.path_param(name).and_then(|v| Uuid::parse_str(v).ok()),
            Self::Header(name) => req
                .parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| Uuid::parse_str(v.trim()).ok()),
            Self::Custom(f) => f(req),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    Owner(OwnerSource),
    AllScopes(Vec<String>),
    AnyScope(Vec<String>),
}

impl Rule {
    pub fn owner_from_path(param: impl Into<String>) -> Self {
        Self::Owner(OwnerSource::PathParam(param.into()))
    }

    pub fn owner_from_header(name: HeaderName) -> Self {
        Self::Owner(OwnerSource::Header(name))
    }

    pub fn owner_with<F>(f: F) -> Self
    where
        F: Fn(&RuleRequest<'_>) -> Option<Uuid> + Send + Sync + 'static,
    {
        Self::Owner(OwnerSource::Custom(Arc::new(f)))
    }

    pub fn all_scopes<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllScopes(tokens.into_iter().map(Into::into).collect())
    }

    pub fn any_scope<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyScope(tokens.into_iter().map(Into::into).collect())
    }

    pub fn evaluate(&self, req: &RuleRequest<'_>, claims: &Claims) -> Result<(), RuleError> {
        match self {
            Self::Owner(source) => {
                let expected = source.resolve(req).ok_or(RuleError::OwnerUnavailable)?;
                if expected.is_nil() {
                    return Err(RuleError::NilOwner);
                }
                if expected != claims.subject.id {
                    return Err(RuleError::OwnerMismatch {
                        expected,
                        actual: claims.subject.id,
                    });
                }
                Ok(())
            }
            Self::AllScopes(required) => {
                if required.iter().all(|t| claims.scope.contains(t)) {
                    Ok(())
                } else {
                    Err(RuleError::MissingAllScopes {
                        expected: required.clone(),
                        actual: claims.scope.to_string(),
                    })
                }
            }
            Self::AnyScope(required) => {
                if required.iter().any(|t| claims.scope.contains(t)) {
                    Ok(())
                } else {
                    Err(RuleError::MissingAnyScope {
                        expected: required.clone(),
                        actual: claims.scope.to_string(),
                    })
                }
            }
        }
    }
}

/// Runs `rules` in order, stopping at the first failure.
pub fn evaluate_all(rules: &[Rule], req: &RuleRequest<'_>, claims: &Claims) -> Result<(), RuleError> {
    rules.iter().try_for_each(|rule| rule.evaluate(req, claims))
}
