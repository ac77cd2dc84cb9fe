//! Scope grammar.
//!
//! A scope is an ordered list of tokens, compared as a set. Three token kinds:
//! - plain permission tokens from the [`known`] catalogue (`user:r`, ...)
//! - tag tokens `tag:<payload>`; `tag:*` grants every tag in code-grant comparisons
//! - extended tokens `ext:<name>`
//!
//! Decoding a scope out of a token is lenient: unrecognised tokens are dropped
//! and only a non-string value fails. The explicit constructors are strict.

mod extended;
pub mod known;
mod tag;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

pub use extended::{EXTENDED_PREFIX, ExtendedToken};
pub use tag::{TAG_PREFIX, TAG_WILDCARD, Tag, is_tag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("unknown scope token '{0}'")]
    UnknownToken(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    tokens: Vec<String>,
}

impl Scope {
    /// Strict parse of a space separated scope string.
    pub fn new(raw: &str) -> Result<Self, ScopeError> {
        Self::from_code_grant_tokens(raw.split_whitespace())
    }

    /// Strict construction from individual tokens, as requested in a code grant.
    pub fn from_code_grant_tokens<I, S>(tokens: I) -> Result<Self, ScopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| {
                let t = t.as_ref();
                if is_valid_token(t) {
                    Ok(t.to_string())
                } else {
                    Err(ScopeError::UnknownToken(t.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    /// Lenient parse: invalid tokens are skipped.
    pub fn parse_lenient(raw: &str) -> Self {
        let tokens = raw
            .split_whitespace()
            .filter(|t| {
                let keep = is_valid_token(t);
                if !keep {
                    tracing::debug!(token = %t, "dropping unrecognised scope token");
                }
                keep
            })
            .map(str::to_string)
            .collect();

        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// True if every token of `other` is granted by this scope, with `tag:*`
    /// standing in for any tag token.
    pub fn contains_code_grant_scope(&self, other: &Scope) -> bool {
        let wildcard = self.contains(TAG_WILDCARD);
        other
            .tokens
            .iter()
            .all(|t| self.contains(t) || (wildcard && is_tag(t)))
    }

    /// Tag payloads in scope order. Empty if the scope holds no tags.
    pub fn tags(&self) -> Vec<Tag> {
        self.tokens.iter().filter_map(|t| Tag::parse(t)).collect()
    }

    pub fn extended_tokens(&self) -> Vec<ExtendedToken> {
        self.tokens
            .iter()
            .filter_map(|t| ExtendedToken::parse(t))
            .collect()
    }
}

fn is_valid_token(token: &str) -> bool {
    known::is_known(token) || is_tag(token) || ExtendedToken::parse(token).is_some()
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScopeVisitor;

        impl de::Visitor<'_> for ScopeVisitor {
            type Value = Scope;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("scope as a space separated string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scope, E> {
                Ok(Scope::parse_lenient(v))
            }
        }

        deserializer.deserialize_str(ScopeVisitor)
    }
}
