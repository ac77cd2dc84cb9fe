use std::sync::Arc;

use super::error::KeyStoreError;
use super::store::CredentialStore;
use super::types::VerificationKey;

/// Source of verification keys for the token verifier.
pub trait KeyProvider: Send + Sync {
    fn verification_keys(&self) -> Result<Arc<[VerificationKey]>, KeyStoreError>;
}

impl KeyProvider for CredentialStore {
    fn verification_keys(&self) -> Result<Arc<[VerificationKey]>, KeyStoreError> {
        CredentialStore::verification_keys(self)
    }
}

/// Fixed key list, for services with a single pinned key.
#[derive(Debug, Clone)]
pub struct StaticKeys {
    keys: Arc<[VerificationKey]>,
}

impl StaticKeys {
    pub fn new(keys: Vec<VerificationKey>) -> Self {
        Self { keys: keys.into() }
    }

    pub fn single(key: VerificationKey) -> Self {
        Self::new(vec![key])
    }
}

impl KeyProvider for StaticKeys {
    fn verification_keys(&self) -> Result<Arc<[VerificationKey]>, KeyStoreError> {
        if self.keys.is_empty() {
            return Err(KeyStoreError::NoVerificationKeys {
                store: "static".into(),
            });
        }
        Ok(self.keys.clone())
    }
}
