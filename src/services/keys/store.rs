/*
 * Responsibility
 * - Hold the current verification keys and the active signing key
 * - Bootstrap once, reload on demand or on file change, merge two stores
 *
 * Notes
 * - Readers clone an Arc snapshot under a short mutex; a reload swaps the whole snapshot
 * - A failed reload keeps the previous snapshot and goes to the error handler
 * - Reloads are serialized from read to swap, so the last one to finish saw the newest source
 */
use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::document::KeyDocument;
use super::error::KeyStoreError;
use super::source::KeySource;
use super::types::{SigningKey, VerificationKey};
use super::watch::{self, WatchHandle};

pub type ErrorHandler = Arc<dyn Fn(&KeyStoreError) + Send + Sync>;

const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct StoreOptions {
    pub name: String,
    pub auto_bootstrap: bool,
    pub watch_changes: bool,
    pub reload_debounce: Duration,
    pub on_error: Option<ErrorHandler>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            name: "default".into(),
            auto_bootstrap: true,
            watch_changes: true,
            reload_debounce: DEFAULT_RELOAD_DEBOUNCE,
            on_error: None,
        }
    }
}

impl StoreOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn auto_bootstrap(mut self, enabled: bool) -> Self {
        self.auto_bootstrap = enabled;
        self
    }

    pub fn watch_changes(mut self, enabled: bool) -> Self {
        self.watch_changes = enabled;
        self
    }

    pub fn reload_debounce(mut self, debounce: Duration) -> Self {
        self.reload_debounce = debounce;
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&KeyStoreError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("name", &self.name)
            .field("auto_bootstrap", &self.auto_bootstrap)
            .field("watch_changes", &self.watch_changes)
            .field("reload_debounce", &self.reload_debounce)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct KeySnapshot {
    verification: Arc<[VerificationKey]>,
    signing: Vec<SigningKey>,
    active: Option<SigningKey>,
}

impl Default for KeySnapshot {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl KeySnapshot {
    fn new(verification: Vec<VerificationKey>, signing: Vec<SigningKey>) -> Self {
        let active = signing.iter().find(|k| k.enabled).cloned();
        Self {
            verification: verification.into(),
            signing,
            active,
        }
    }
}

/// Hot-reloadable holder of verification and signing keys.
pub struct CredentialStore {
    name: String,
    source: Option<KeySource>,
    snapshot: Mutex<Arc<KeySnapshot>>,
    bootstrapped: Mutex<bool>,
    reload_lock: Mutex<()>,
    last_error: Mutex<Option<KeyStoreError>>,
    on_error: ErrorHandler,
    reload_debounce: Duration,
    watcher: Mutex<Option<WatchHandle>>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("name", &self.name)
            .field("source", &self.source.as_ref().map(source_kind))
            .field("snapshot", &self.snapshot())
            .field("watching", &self.is_watching())
            .finish()
    }
}

impl CredentialStore {
    /// Creates a store. Bootstrap and watch failures are recorded (see
    /// [`CredentialStore::last_error`]) rather than returned.
    pub fn new(source: KeySource, options: StoreOptions) -> Arc<Self> {
        let on_error = options.on_error.unwrap_or_else(|| {
            let name = options.name.clone();
            let handler: ErrorHandler = Arc::new(move |err: &KeyStoreError| {
                tracing::error!(store = %name, error = %err, "credential store error");
            });
            handler
        });
        let watchable = !matches!(source, KeySource::Memory(_));

        let store = Arc::new(Self {
            name: options.name,
            source: Some(source),
            snapshot: Mutex::new(Arc::default()),
            bootstrapped: Mutex::new(false),
            reload_lock: Mutex::new(()),
            last_error: Mutex::new(None),
            on_error,
            reload_debounce: options.reload_debounce,
            watcher: Mutex::new(None),
        });

        if options.auto_bootstrap {
            if let Err(err) = store.bootstrap() {
                warn!(store = %store.name, error = %err, "credential store bootstrap failed");
            }
        }

        if options.watch_changes && watchable {
            if let Err(err) = store.watch() {
                store.report(&err);
            }
        }

        store
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads and parses the source on the first call only.
    pub fn bootstrap(&self) -> Result<(), KeyStoreError> {
        let mut done = self.bootstrapped.lock();
        if *done {
            return Ok(());
        }
        *done = true;
        self.reload()
    }

    /// Re-reads the source and swaps in a fresh snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), KeyStoreError> {
        let Some(source) = &self.source else {
            debug!(store = %self.name, "store has no source, nothing to reload");
            return Ok(());
        };
        let _reloading = self.reload_lock.lock();

        let parsed = match source
            .load()
            .and_then(|loaded| KeyDocument::from_yaml(&loaded.contents))
        {
            Ok(doc) => doc.into_keys(),
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };

        for err in &parsed.errors {
            self.report(err);
        }

        if parsed.public_entries > 0 && parsed.verification.is_empty() {
            let err = KeyStoreError::NoValidEntries {
                entries: parsed.public_entries,
            };
            self.report(&err);
            return Err(err);
        }

        let partial = !parsed.errors.is_empty();
        let snapshot = Arc::new(KeySnapshot::new(parsed.verification, parsed.signing));
        info!(
            store = %self.name,
            verification_keys = snapshot.verification.len(),
            signing_keys = snapshot.signing.len(),
            active = snapshot.active.as_ref().map(|k| k.name.as_str()).unwrap_or("none"),
            partial,
            "credential store loaded"
        );

        *self.snapshot.lock() = snapshot;
        if !partial {
            *self.last_error.lock() = None;
        }
        Ok(())
    }

    pub fn verification_keys(&self) -> Result<Arc<[VerificationKey]>, KeyStoreError> {
        self.bootstrap()?;

        let keys = self.snapshot().verification.clone();
        if keys.is_empty() {
            return Err(KeyStoreError::NoVerificationKeys {
                store: self.name.clone(),
            });
        }
        Ok(keys)
    }

    /// First enabled private key in source order.
    pub fn signing_key(&self) -> Result<SigningKey, KeyStoreError> {
        self.bootstrap()?;

        self.snapshot()
            .active
            .clone()
            .ok_or_else(|| KeyStoreError::NoEnabledSigningKey {
                store: self.name.clone(),
            })
    }

    /// Last load failure, cleared by the next clean load.
    pub fn last_error(&self) -> Option<KeyStoreError> {
        self.last_error.lock().clone()
    }

    /// Starts the background watcher. A no-op if already watching.
    pub fn watch(self: &Arc<Self>) -> Result<(), KeyStoreError> {
        let Some(source) = &self.source else {
            return Err(KeyStoreError::Watch(format!(
                "store '{}' has no source to watch",
                self.name
            )));
        };
        let Some(path) = source.resolve()? else {
            return Err(KeyStoreError::Watch(format!(
                "store '{}' reads from memory",
                self.name
            )));
        };

        let mut watcher = self.watcher.lock();
        if watcher.is_none() {
            *watcher = Some(watch::spawn(self, path, self.reload_debounce)?);
        }
        Ok(())
    }

    pub fn stop_watching(&self) {
        if let Some(handle) = self.watcher.lock().take() {
            info!(store = %self.name, path = %handle.path().display(), "stopped watching key config");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    /// Combines both stores' keys into a new store named `merged-<a>+<b>`.
    ///
    /// Both stores stop watching, and the merged store never reloads: later
    /// changes to either source are not reflected.
    pub fn merge(&self, other: &CredentialStore) -> Arc<CredentialStore> {
        self.stop_watching();
        other.stop_watching();

        for store in [self, other] {
            if let Err(err) = store.bootstrap() {
                warn!(store = %store.name, error = %err, "merging a store that failed to bootstrap");
            }
        }

        let (a, b) = (self.snapshot(), other.snapshot());
        let verification = a.verification.iter().chain(b.verification.iter()).cloned().collect();
        let signing = a.signing.iter().chain(&b.signing).cloned().collect();

        let merged = Arc::new(Self {
            name: format!("merged-{}+{}", self.name, other.name),
            source: None,
            snapshot: Mutex::new(Arc::new(KeySnapshot::new(verification, signing))),
            bootstrapped: Mutex::new(true),
            reload_lock: Mutex::new(()),
            last_error: Mutex::new(None),
            on_error: self.on_error.clone(),
            reload_debounce: self.reload_debounce,
            watcher: Mutex::new(None),
        });
        merged.log_summary();
        merged
    }

    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            store = %self.name,
            verification_keys = snapshot.verification.len(),
            signing_keys = snapshot.signing.len(),
            active = snapshot.active.as_ref().map(|k| k.name.as_str()).unwrap_or("none"),
            watching = self.is_watching(),
            "credential store summary"
        );
        for key in snapshot.verification.iter() {
            debug!(store = %self.name, key = %key.name, fingerprint = %key.fingerprint(), "verification key");
        }
        for key in &snapshot.signing {
            debug!(
                store = %self.name,
                key = %key.name,
                enabled = key.enabled,
                fingerprint = %key.fingerprint(),
                "signing key"
            );
        }
    }

    fn snapshot(&self) -> Arc<KeySnapshot> {
        self.snapshot.lock().clone()
    }

    fn report(&self, err: &KeyStoreError) {
        *self.last_error.lock() = Some(err.clone());
        (self.on_error)(err);
    }
}

fn source_kind(source: &KeySource) -> &'static str {
    match source {
        KeySource::File(_) => "file",
        KeySource::Search { .. } => "search",
        KeySource::Memory(_) => "memory",
    }
}
