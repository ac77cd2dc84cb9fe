//! File watcher driving credential store reloads.
//!
//! The notify callback runs on the watcher's own thread and only pokes a
//! bounded channel; a tokio task drains it, debounces, and reloads. The task
//! holds a weak reference so dropping the store ends it.
//!
//! Besides writes to the file itself, a change of the file's resolved target
//! triggers a reload. That covers configs mounted through a symlink chain
//! whose intermediate link (`..data -> ..2024_01_01`) is swapped atomically
//! while the configured path never sees an event.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use super::error::KeyStoreError;
use super::store::CredentialStore;

pub(crate) struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    path: PathBuf,
}

impl WatchHandle {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(crate) fn spawn(
    store: &Arc<CredentialStore>,
    path: PathBuf,
    debounce: Duration,
) -> Result<WatchHandle, KeyStoreError> {
    let runtime = Handle::try_current()
        .map_err(|_| KeyStoreError::Watch("hot reload needs a tokio runtime".into()))?;

    let file_name = path
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| KeyStoreError::Watch(format!("{} has no file name", path.display())))?;

    // Watch the directory so editors that replace the file by rename are seen too.
    let watch_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::channel::<()>(16);
    let target_path = path.clone();
    let mut target = std::fs::canonicalize(&target_path).ok();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        let Ok(event) = res else {
            return;
        };
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }

        let touched = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()));

        let resolved = std::fs::canonicalize(&target_path).ok();
        let retargeted = resolved != target;
        if retargeted {
            debug!(path = %target_path.display(), target = ?resolved, "key config target changed");
            target = resolved;
        }

        if touched || retargeted {
            // A full channel already has a reload queued.
            let _ = tx.try_send(());
        }
    })
    .map_err(|e| KeyStoreError::Watch(e.to_string()))?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| KeyStoreError::Watch(format!("{}: {e}", watch_dir.display())))?;

    let weak = Arc::downgrade(store);
    let name = store.name().to_string();
    let task = runtime.spawn(async move {
        while rx.recv().await.is_some() {
            tokio::time::sleep(debounce).await;
            while rx.try_recv().is_ok() {}

            let Some(store) = weak.upgrade() else {
                break;
            };
            match tokio::task::spawn_blocking(move || store.reload()).await {
                Ok(Ok(())) => info!(store = %name, "key config reloaded"),
                Ok(Err(err)) => {
                    warn!(store = %name, error = %err, "key config reload failed, keeping previous keys")
                }
                Err(err) => warn!(store = %name, error = %err, "key config reload task failed"),
            }
        }
        debug!(store = %name, "key config watcher stopped");
    });

    info!(store = %store.name(), path = %path.display(), "watching key config for changes");

    Ok(WatchHandle {
        _watcher: watcher,
        task,
        path,
    })
}
