use std::path::PathBuf;

use thiserror::Error;

/// Failures of the credential store.
///
/// Cloneable so the last failure can be kept on the store and handed to
/// error handlers without giving up ownership.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    #[error("cannot find key config '{file_name}' in {searched:?}")]
    SourceNotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("error reading key config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("malformed key config: {0}")]
    Malformed(String),

    #[error("invalid key entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    #[error("key config lists {entries} public keys but none could be parsed")]
    NoValidEntries { entries: usize },

    #[error("store '{store}' found 0 valid public keys")]
    NoVerificationKeys { store: String },

    #[error("store '{store}' found 0 enabled private keys")]
    NoEnabledSigningKey { store: String },

    #[error("cannot watch key config: {0}")]
    Watch(String),
}

impl KeyStoreError {
    /// True for failures that keep a document from loading at all.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidEntry { .. })
    }
}
