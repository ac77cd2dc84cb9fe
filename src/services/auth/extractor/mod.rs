//! Bearer token extraction.
//!
//! Locations are tried in a fixed order: `Authorization` header, form/query
//! argument, then (opt-in) cookie. The first location holding anything is
//! used exclusively. A present but unusable value fails the extraction
//! instead of falling through, so a bad header can never be rescued by a
//! valid form value, and a cookie token cannot skip its CSRF check by riding
//! alongside a header.

mod csrf;
mod request;

use axum::http::header;
use thiserror::Error;

pub use csrf::{CSRF_COOKIE_NAME, CSRF_FORM_FIELD, CSRF_HEADER_NAME, CsrfError, CsrfPolicy};
pub use request::TokenRequest;

pub const ACCESS_COOKIE_NAME: &str = "phdp-access-token";
pub const ACCESS_TOKEN_ARGUMENT: &str = "access_token";

const BEARER_PREFIX: &str = "bearer ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("access token not found in the request")]
    NotFound,
    #[error("malformed authorization header: {0}")]
    MalformedHeader(&'static str),
    #[error("access token cookie rejected: {0}")]
    Csrf(#[from] CsrfError),
}

impl ExtractError {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    Header,
    Argument,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    pub token: String,
    pub location: TokenLocation,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub accept_cookie: bool,
    pub cookie_name: String,
    pub argument_name: String,
    pub csrf: CsrfPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            accept_cookie: false,
            cookie_name: ACCESS_COOKIE_NAME.to_string(),
            argument_name: ACCESS_TOKEN_ARGUMENT.to_string(),
            csrf: CsrfPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    Header,
    Argument { name: String },
    Cookie { name: String, csrf: CsrfPolicy },
}

enum Lookup {
    Absent,
    Found(String),
    Rejected(ExtractError),
}

#[derive(Debug, Clone)]
pub struct TokenExtractor {
    strategies: Vec<Strategy>,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl TokenExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        let mut strategies = vec![
            Strategy::Header,
            Strategy::Argument {
                name: config.argument_name.clone(),
            },
        ];
        if config.accept_cookie {
            strategies.push(Strategy::Cookie {
                name: config.cookie_name.clone(),
                csrf: config.csrf.clone(),
            });
        }
        Self { strategies }
    }

    pub fn locations(&self) -> Vec<TokenLocation> {
        self.strategies.iter().map(Strategy::location).collect()
    }

    pub fn extract(&self, req: &TokenRequest<'_>) -> Result<ExtractedToken, ExtractError> {
        for strategy in &self.strategies {
            match strategy.lookup(req) {
                Lookup::Absent => continue,
                Lookup::Found(token) => {
                    return Ok(ExtractedToken {
                        token,
                        location: strategy.location(),
                    });
                }
                Lookup::Rejected(err) => return Err(err),
            }
        }
        Err(ExtractError::NotFound)
    }
}

impl Strategy {
    fn location(&self) -> TokenLocation {
        match self {
            Self::Header => TokenLocation::Header,
            Self::Argument { .. } => TokenLocation::Argument,
            Self::Cookie { .. } => TokenLocation::Cookie,
        }
    }

    fn lookup(&self, req: &TokenRequest<'_>) -> Lookup {
        match self {
            Self::Header => lookup_header(req),
            Self::Argument { name } => match req.form_value(name) {
                Some(token) => Lookup::Found(token),
                None => Lookup::Absent,
            },
            Self::Cookie { name, csrf } => {
                let Some(token) = req.cookie(name) else {
                    return Lookup::Absent;
                };
                match csrf.verify(req) {
                    Ok(()) => Lookup::Found(token.to_string()),
                    Err(err) => Lookup::Rejected(err.into()),
                }
            }
        }
    }
}

fn lookup_header(req: &TokenRequest<'_>) -> Lookup {
    let Some(value) = req.headers.get(header::AUTHORIZATION) else {
        return Lookup::Absent;
    };
    let Ok(value) = value.to_str() else {
        return Lookup::Rejected(ExtractError::MalformedHeader("not visible ascii"));
    };
    let value = value.trim();
    if value.is_empty() {
        return Lookup::Absent;
    }

    let scheme = value.get(..BEARER_PREFIX.len());
    if !scheme.is_some_and(|s| s.eq_ignore_ascii_case(BEARER_PREFIX)) {
        return Lookup::Rejected(ExtractError::MalformedHeader("expected Bearer scheme"));
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Lookup::Rejected(ExtractError::MalformedHeader("empty bearer token"));
    }
    Lookup::Found(token.to_string())
}
