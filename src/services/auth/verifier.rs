use std::{fmt, sync::Arc};

use chrono::Utc;
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use thiserror::Error;
use tracing::debug;

use super::claims::{Claims, ClaimsError};
use crate::services::keys::{KeyProvider, KeyStoreError};

/// Errors returned by access token verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification keys unavailable: {0}")]
    Keys(#[from] KeyStoreError),
    #[error("invalid token")]
    InvalidToken,
    #[error("malformed token claims: {0}")]
    MalformedClaims(String),
    #[error("invalid token claims: {0}")]
    Claims(#[from] ClaimsError),
}

/// RS256 access token verifier trying every known key in order.
///
/// - Signature only decides which key matched; time validity is checked on
///   [`Claims`] afterwards so the two failures stay distinguishable.
/// - Key material is not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeyProvider>,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self { keys, validation }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as of `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, VerifyError> {
        let keys = self.keys.verification_keys()?;

        if jsonwebtoken::decode_header(token).is_err() {
            return Err(VerifyError::InvalidToken);
        }

        let total = keys.len();
        for (idx, key) in keys.iter().enumerate() {
            match jsonwebtoken::decode::<Claims>(token, key.decoding_key(), &self.validation) {
                Ok(data) => {
                    debug!(key = %key.name, "token signature verified");
                    data.claims.validate_at(now)?;
                    return Ok(data.claims);
                }
                // The signature has been checked before claims are deserialized.
                Err(err) if matches!(err.kind(), ErrorKind::Json(_)) => {
                    return Err(VerifyError::MalformedClaims(err.to_string()));
                }
                Err(err) => {
                    debug!(
                        key = %key.name,
                        position = idx + 1,
                        total,
                        error = %err,
                        "verification key does not match"
                    );
                }
            }
        }

        debug!(total, "verification failed for all keys");
        Err(VerifyError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use uuid::Uuid;

    use super::*;
    use crate::services::auth::claims::ISSUER;
    use crate::services::keys::StaticKeys;
    use crate::testutil;

    const NOW: i64 = 1_700_000_000;

    fn verifier(indices: &[usize]) -> TokenVerifier {
        let keys = indices
            .iter()
            .map(|&i| testutil::verification_key(&format!("k{i}"), i))
            .collect();
        TokenVerifier::new(Arc::new(StaticKeys::new(keys)))
    }

    fn sign(claims: &impl serde::Serialize, key: usize) -> String {
        let encoding = EncodingKey::from_rsa_pem(testutil::private_pem(key).as_bytes()).unwrap();
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &encoding).unwrap()
    }

    fn claims() -> Claims {
        testutil::claims_at(Uuid::new_v4(), NOW)
    }

    #[test]
    fn accepts_token_from_any_listed_key() {
        let c = claims();
        for signer in [0, 1, 2] {
            let token = sign(&c, signer);
            assert_eq!(verifier(&[0, 1, 2]).verify_at(&token, NOW).unwrap(), c);
        }
    }

    #[test]
    fn rejects_foreign_key() {
        let token = sign(&claims(), 3);
        assert!(matches!(
            verifier(&[0, 1]).verify_at(&token, NOW),
            Err(VerifyError::InvalidToken)
        ));
    }

    #[test]
    fn claims_failures_are_distinct() {
        let token = sign(&claims(), 0);
        assert!(matches!(
            verifier(&[0]).verify_at(&token, NOW + 3600),
            Err(VerifyError::Claims(ClaimsError::Expired))
        ));

        let mut c = claims();
        c.issuer = "urn:elsewhere".into();
        assert!(matches!(
            verifier(&[0]).verify_at(&sign(&c, 0), NOW),
            Err(VerifyError::Claims(ClaimsError::InvalidIssuer))
        ));
    }

    #[test]
    fn signed_garbage_claims_are_malformed() {
        let payload = serde_json::json!({
            "sub": "user:123",
            "iss": ISSUER,
            "exp": NOW + 60,
            "nbf": NOW - 60,
        });
        assert!(matches!(
            verifier(&[1, 0]).verify_at(&sign(&payload, 0), NOW),
            Err(VerifyError::MalformedClaims(_))
        ));
    }

    #[test]
    fn structurally_broken_tokens_are_invalid() {
        for token in ["", "abc", "a.b.c", "not.a.jwt.at.all"] {
            assert!(matches!(
                verifier(&[0]).verify_at(token, NOW),
                Err(VerifyError::InvalidToken)
            ));
        }
    }

    #[test]
    fn hmac_tokens_are_not_accepted() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims(),
            &EncodingKey::from_secret(b"shared"),
        )
        .unwrap();
        assert!(matches!(
            verifier(&[0]).verify_at(&token, NOW),
            Err(VerifyError::InvalidToken)
        ));
    }

    #[test]
    fn empty_key_set_is_a_key_error() {
        let verifier = TokenVerifier::new(Arc::new(StaticKeys::new(Vec::new())));
        assert!(matches!(
            verifier.verify_at(&sign(&claims(), 0), NOW),
            Err(VerifyError::Keys(KeyStoreError::NoVerificationKeys { .. }))
        ));
    }
}
