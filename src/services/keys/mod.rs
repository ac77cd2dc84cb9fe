/*
 * Responsibility
 * - Credential store: verification/signing keys loaded from a key document
 * - Hot reload on file change, merge of two stores
 * - KeyProvider seam used by the token verifier
 */
mod document;
mod error;
mod provider;
mod source;
mod store;
mod types;
mod watch;

pub use document::{KeyDocument, ParsedKeys, PrivateKeyEntry, PublicKeyEntry};
pub use error::KeyStoreError;
pub use provider::{KeyProvider, StaticKeys};
pub use source::{DEFAULT_FILE_NAME, KeySource, LoadedSource};
pub use store::{CredentialStore, ErrorHandler, StoreOptions};
pub use types::{KeyTimestamp, SigningKey, VerificationKey};
