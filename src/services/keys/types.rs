/*
 * Responsibility
 * - Parsed key records handed out by the credential store
 * - Key material stays opaque: Debug prints name and fingerprint only
 */
use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};

/// Timestamp metadata exactly as written in the key document.
///
/// `parsed` is set when the text is RFC 3339 or a bare `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTimestamp {
    pub raw: String,
    pub parsed: Option<DateTime<Utc>>,
}

/// Public key used to verify access token signatures.
///
/// `not_before`/`not_after` are carried for operators only; verification does
/// not look at them.
#[derive(Clone)]
pub struct VerificationKey {
    pub name: String,
    pub comment: String,
    pub not_before: Option<KeyTimestamp>,
    pub not_after: Option<KeyTimestamp>,
    key: DecodingKey,
    fingerprint: String,
}

impl VerificationKey {
    /// Parses an RSA public key (PKCS#1 or SPKI PEM).
    pub fn from_pem(name: impl Into<String>, pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self {
            name: name.into(),
            comment: String::new(),
            not_before: None,
            not_after: None,
            key,
            fingerprint: fingerprint(pem),
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("name", &self.name)
            .field("comment", &self.comment)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Private key able to sign access tokens.
#[derive(Clone)]
pub struct SigningKey {
    pub name: String,
    pub comment: String,
    pub enabled: bool,
    pub created_at: Option<KeyTimestamp>,
    pub author: String,
    key: EncodingKey,
    fingerprint: String,
}

impl SigningKey {
    /// Parses an RSA private key (PKCS#1 or PKCS#8 PEM).
    pub fn from_pem(
        name: impl Into<String>,
        pem: &str,
        enabled: bool,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self {
            name: name.into(),
            comment: String::new(),
            enabled,
            created_at: None,
            author: String::new(),
            key,
            fingerprint: fingerprint(pem),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.key
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKey")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .field("author", &self.author)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// First 8 bytes of the SHA-256 over the trimmed PEM text, hex encoded.
fn fingerprint(pem: &str) -> String {
    Sha256::digest(pem.trim().as_bytes())
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}
