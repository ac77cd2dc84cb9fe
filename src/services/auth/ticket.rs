//! Short-lived HMAC tickets for machine-to-machine calls.
//!
//! One shared key, no rotation. A ticket names a study and the subjects it
//! may touch; it expires `validity` after creation.

use std::{fmt, time::Duration};

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClaims {
    pub exp: i64,
    #[serde(rename = "studyID")]
    pub study_id: String,
    #[serde(rename = "subjectIds", default)]
    pub subject_ids: Vec<Uuid>,
}

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket key must not be empty")]
    EmptyKey,
    #[error("ticket is expired")]
    Expired,
    #[error("ticket signature is invalid")]
    InvalidSignature,
    #[error("ticket uses an unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("malformed ticket: {0}")]
    Malformed(String),
    #[error("failed to sign ticket: {0}")]
    Sign(String),
}

impl From<jsonwebtoken::errors::Error> for TicketError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnexpectedAlgorithm
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct Ticketer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl fmt::Debug for Ticketer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticketer")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl Ticketer {
    pub fn new(key: &[u8], validity: Duration) -> Result<Self, TicketError> {
        if key.is_empty() {
            return Err(TicketError::EmptyKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            validity,
        })
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn create(&self, study_id: &str, subject_ids: &[Uuid]) -> Result<String, TicketError> {
        self.create_at(study_id, subject_ids, Utc::now().timestamp())
    }

    /// Creates a ticket as if issued at `now` (unix seconds).
    pub fn create_at(
        &self,
        study_id: &str,
        subject_ids: &[Uuid],
        now: i64,
    ) -> Result<String, TicketError> {
        let validity = i64::try_from(self.validity.as_secs()).unwrap_or(i64::MAX);
        let claims = TicketClaims {
            exp: now.saturating_add(validity),
            study_id: study_id.to_string(),
            subject_ids: subject_ids.to_vec(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TicketError::Sign(e.to_string()))
    }

    pub fn verify(&self, ticket: &str) -> Result<TicketClaims, TicketError> {
        let data = jsonwebtoken::decode::<TicketClaims>(ticket, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testutil;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn ticketer() -> Ticketer {
        Ticketer::new(KEY, Duration::from_secs(300)).unwrap()
    }

    #[test]
    fn round_trip() {
        let subjects = [Uuid::new_v4(), Uuid::new_v4()];
        let ticket = ticketer().create("study-1", &subjects).unwrap();

        let claims = ticketer().verify(&ticket).unwrap();
        assert_eq!(claims.study_id, "study-1");
        assert_eq!(claims.subject_ids, subjects);
    }

    #[test]
    fn wrong_key_is_a_signature_error() {
        let ticket = ticketer().create("s", &[]).unwrap();
        let other = Ticketer::new(b"another key", Duration::from_secs(300)).unwrap();
        assert!(matches!(other.verify(&ticket), Err(TicketError::InvalidSignature)));
    }

    #[test]
    fn expired_ticket() {
        let past = Utc::now().timestamp() - 3600;
        let ticket = ticketer().create_at("s", &[], past).unwrap();
        assert!(matches!(ticketer().verify(&ticket), Err(TicketError::Expired)));
    }

    #[test]
    fn bad_claim_types_are_malformed() {
        let payload = serde_json::json!({
            "exp": Utc::now().timestamp() + 60,
            "studyID": 42,
        });
        let ticket = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();
        assert!(matches!(ticketer().verify(&ticket), Err(TicketError::Malformed(_))));
    }

    #[test]
    fn rejects_asymmetric_tokens() {
        let payload = serde_json::json!({ "exp": Utc::now().timestamp() + 60, "studyID": "s" });
        let rsa = EncodingKey::from_rsa_pem(testutil::private_pem(0).as_bytes()).unwrap();
        let ticket = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &payload, &rsa).unwrap();
        assert!(matches!(
            ticketer().verify(&ticket),
            Err(TicketError::UnexpectedAlgorithm)
        ));
    }

    #[test]
    fn empty_key_is_refused() {
        assert!(matches!(
            Ticketer::new(b"", Duration::from_secs(1)),
            Err(TicketError::EmptyKey)
        ));
    }
}
