/*
 * Responsibility
 * - Token subject wrapper: `owner:<uuid>` on the wire
 * - Strict parse (no lenient fallback); the nil UUID is representable but never authorizes
 */
use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;
use uuid::Uuid;

pub const OWNER_PREFIX: &str = "owner";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerError {
    #[error("invalid owner: expected '{OWNER_PREFIX}:<uuid>'")]
    Invalid,
    #[error("subject is not an owner (prefix '{0}')")]
    NotOwner(String),
    #[error("invalid owner id: {0}")]
    InvalidId(String),
}

/// Subject of an access token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Owner {
    pub id: Uuid,
}

impl Owner {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    pub fn is_nil(&self) -> bool {
        self.id.is_nil()
    }
}

impl From<Uuid> for Owner {
    fn from(id: Uuid) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OWNER_PREFIX}:{}", self.id)
    }
}

impl FromStr for Owner {
    type Err = OwnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s.split_once(':').ok_or(OwnerError::Invalid)?;
        if prefix != OWNER_PREFIX {
            return Err(OwnerError::NotOwner(prefix.to_string()));
        }

        Uuid::parse_str(id)
            .map(Self::new)
            .map_err(|e| OwnerError::InvalidId(e.to_string()))
    }
}

impl Serialize for Owner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Owner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let owner = Owner::new(Uuid::new_v4());
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, format!("\"owner:{}\"", owner.id));

        let back: Owner = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, owner.id);
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(
            "7c4f0f6e-3d6b-4d0c-9c35-5a3c0c7b1d11".parse::<Owner>(),
            Err(OwnerError::Invalid)
        );
    }

    #[test]
    fn rejects_foreign_prefix() {
        let err = "user:7c4f0f6e-3d6b-4d0c-9c35-5a3c0c7b1d11"
            .parse::<Owner>()
            .unwrap_err();
        assert_eq!(err, OwnerError::NotOwner("user".into()));
    }

    #[test]
    fn rejects_non_uuid_suffix() {
        assert!(matches!(
            "owner:not-a-uuid".parse::<Owner>(),
            Err(OwnerError::InvalidId(_))
        ));
        assert!(serde_json::from_str::<Owner>("\"owner:\"").is_err());
        assert!(serde_json::from_str::<Owner>("42").is_err());
    }

    #[test]
    fn nil_owner_is_flagged() {
        assert!(Owner::default().is_nil());
        assert!(!Owner::new(Uuid::new_v4()).is_nil());
    }
}
