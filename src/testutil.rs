//! Fixtures shared by unit tests: RSA key pairs from `testdata/keys` and a
//! key document builder.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use uuid::Uuid;

use crate::services::auth::claims::{Claims, ISSUER};
use crate::services::auth::owner::Owner;
use crate::services::auth::scope::Scope;
use crate::services::keys::{SigningKey, VerificationKey};

macro_rules! key_file {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/keys/", $file))
    };
}

const PRIVATE_KEYS: [&str; 6] = [
    key_file!("rsa-0.key"),
    key_file!("rsa-1.key"),
    key_file!("rsa-2.key"),
    key_file!("rsa-3.key"),
    key_file!("rsa-4.key"),
    key_file!("rsa-5.key"),
];

const PUBLIC_KEYS: [&str; 6] = [
    key_file!("rsa-0.pub"),
    key_file!("rsa-1.pub"),
    key_file!("rsa-2.pub"),
    key_file!("rsa-3.pub"),
    key_file!("rsa-4.pub"),
    key_file!("rsa-5.pub"),
];

pub(crate) fn private_pem(index: usize) -> &'static str {
    PRIVATE_KEYS[index]
}

pub(crate) fn public_pem(index: usize) -> &'static str {
    PUBLIC_KEYS[index]
}

pub(crate) fn verification_key(name: &str, index: usize) -> VerificationKey {
    VerificationKey::from_pem(name, public_pem(index)).unwrap()
}

pub(crate) fn signing_key(name: &str, index: usize) -> SigningKey {
    SigningKey::from_pem(name, private_pem(index), true).unwrap()
}

/// Claims valid from one minute before `now` until one minute after.
pub(crate) fn claims_at(subject: Uuid, now: i64) -> Claims {
    Claims {
        subject: Owner::new(subject),
        issuer: ISSUER.to_string(),
        expires_at: Some(now + 60),
        not_before: Some(now - 60),
        issued_at: Some(now - 60),
        jwt_id: Uuid::new_v4(),
        user_id: subject,
        client_id: "test-client".into(),
        scope: Scope::new("user:r tag:a").unwrap(),
        ..Claims::default()
    }
}

pub(crate) fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().map(|l| format!("{pad}{l}\n")).collect()
}

/// Builds a YAML key document from fixture key indices.
#[derive(Debug, Default)]
pub(crate) struct KeyDoc {
    public: Vec<(String, usize)>,
    private: Vec<(String, usize, bool)>,
}

impl KeyDoc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn public(mut self, name: &str, index: usize) -> Self {
        self.public.push((name.to_string(), index));
        self
    }

    pub(crate) fn private(mut self, name: &str, index: usize, enabled: bool) -> Self {
        self.private.push((name.to_string(), index, enabled));
        self
    }

    pub(crate) fn to_yaml(&self) -> String {
        let mut out = String::new();
        if !self.public.is_empty() {
            out.push_str("JWTPublicKey:\n");
            for (name, index) in &self.public {
                out.push_str(&format!("  - name: {name}\n    comment: fixture\n    key: |\n"));
                out.push_str(&indent(public_pem(*index), 6));
            }
        }
        if !self.private.is_empty() {
            out.push_str("JWTPrivateKey:\n");
            for (name, index, enabled) in &self.private {
                out.push_str(&format!(
                    "  - name: {name}\n    enabled: {enabled}\n    author: tests\n    key: |\n"
                ));
                out.push_str(&indent(private_pem(*index), 6));
            }
        }
        out
    }
}
