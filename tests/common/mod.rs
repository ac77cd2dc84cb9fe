//! Shared fixtures for integration tests: RSA key pairs from `testdata/keys`,
//! key documents, token minting and router plumbing.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Response;
use chrono::TimeDelta;
use serde_json::Value;
use token_gate::services::auth::{
    AccessTokenOptions, Authenticator, ExtractorConfig, Scope, Ticketer, TokenIssuer,
};
use token_gate::services::keys::{CredentialStore, KeySource, SigningKey, StoreOptions};
use token_gate::state::AppState;
use uuid::Uuid;

pub const PRIVATE_KEYS: [&str; 6] = [
    include_str!("../../testdata/keys/rsa-0.key"),
    include_str!("../../testdata/keys/rsa-1.key"),
    include_str!("../../testdata/keys/rsa-2.key"),
    include_str!("../../testdata/keys/rsa-3.key"),
    include_str!("../../testdata/keys/rsa-4.key"),
    include_str!("../../testdata/keys/rsa-5.key"),
];

pub const PUBLIC_KEYS: [&str; 6] = [
    include_str!("../../testdata/keys/rsa-0.pub"),
    include_str!("../../testdata/keys/rsa-1.pub"),
    include_str!("../../testdata/keys/rsa-2.pub"),
    include_str!("../../testdata/keys/rsa-3.pub"),
    include_str!("../../testdata/keys/rsa-4.pub"),
    include_str!("../../testdata/keys/rsa-5.pub"),
];

pub const TICKET_KEY: &[u8] = b"integration-ticket-key";

pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().map(|l| format!("{pad}{l}\n")).collect()
}

/// Key document with fixture `public` keys and `(index, enabled)` private keys,
/// each named `key-<index>`.
pub fn key_doc(public: &[usize], private: &[(usize, bool)]) -> String {
    let mut out = String::new();
    if !public.is_empty() {
        out.push_str("JWTPublicKey:\n");
        for i in public {
            out.push_str(&format!("  - name: key-{i}\n    key: |\n"));
            out.push_str(&indent(PUBLIC_KEYS[*i], 6));
        }
    }
    if !private.is_empty() {
        out.push_str("JWTPrivateKey:\n");
        for (i, enabled) in private {
            out.push_str(&format!("  - name: key-{i}\n    enabled: {enabled}\n    key: |\n"));
            out.push_str(&indent(PRIVATE_KEYS[*i], 6));
        }
    }
    out
}

pub fn memory_store(yaml: String) -> Arc<CredentialStore> {
    CredentialStore::new(KeySource::Memory(yaml), StoreOptions::named("test"))
}

pub fn issuer(index: usize) -> TokenIssuer {
    let key = SigningKey::from_pem(format!("key-{index}"), PRIVATE_KEYS[index], true)
        .expect("signing key");
    TokenIssuer::new(key)
}

/// A five-minute token for `subject` carrying `scope`.
pub fn token(index: usize, subject: Uuid, scope: &str) -> String {
    let options = AccessTokenOptions::new(subject, TimeDelta::minutes(5))
        .scope(Scope::new(scope).expect("scope"))
        .client_id("integration");
    issuer(index)
        .issue(options)
        .expect("issue")
        .access_token
}

pub fn state(store: Arc<CredentialStore>, extractor: ExtractorConfig) -> AppState {
    let auth = Arc::new(Authenticator::new(store.clone(), &extractor));
    let ticketer = Ticketer::new(TICKET_KEY, std::time::Duration::from_secs(60)).expect("ticketer");
    AppState::new(auth, store, Some(Arc::new(ticketer)))
}

pub fn app(store: Arc<CredentialStore>) -> Router {
    token_gate::app::build_router(state(store, ExtractorConfig::default()))
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Key document where every `(name, index, enabled)` entry contributes both
/// its public and its private half.
pub fn named_key_doc(entries: &[(&str, usize, bool)]) -> String {
    let mut out = String::from("JWTPublicKey:\n");
    for (name, i, _) in entries {
        out.push_str(&format!("  - name: {name}\n    key: |\n"));
        out.push_str(&indent(PUBLIC_KEYS[*i], 6));
    }
    out.push_str("JWTPrivateKey:\n");
    for (name, i, enabled) in entries {
        out.push_str(&format!("  - name: {name}\n    enabled: {enabled}\n    key: |\n"));
        out.push_str(&indent(PRIVATE_KEYS[*i], 6));
    }
    out
}
