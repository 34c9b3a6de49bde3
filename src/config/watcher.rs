//! Hot reload of the host blacklist from the config file.
//!
//! The file is re-read and re-validated on every write. Only configs that pass
//! validation reach the reload task; a broken edit leaves the live blacklist
//! in place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GateConfig;
use crate::gate::{AllowWhen, SharedBlacklist};
use crate::observability::metrics;

/// Fallback poll interval for platforms without native file events.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Turns writes to the config file into validated [`GateConfig`] updates.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<GateConfig>,
}

impl ConfigWatcher {
    /// Pair a watcher for `path` with the receiving end of its update stream.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, rx)
    }

    /// Register with the OS. Dropping the returned handle stops the stream.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, updates } = self;
        let reload_path = path.clone();

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_content(&event.kind) => reload(&reload_path, &updates),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Config watch event failed"),
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;
        handle.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Watching config for blacklist changes");
        Ok(handle)
    }
}

fn touches_content(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

fn reload(path: &Path, updates: &mpsc::UnboundedSender<GateConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "Config re-read");
            if updates.send(config).is_err() {
                tracing::debug!("Reload task gone, dropping config update");
            }
        }
        Err(e) => tracing::error!(
            path = %path.display(),
            error = %e,
            "Rejected config edit, blacklist unchanged"
        ),
    }
}

/// Apply a reloaded config to the live gate state.
///
/// Only the host blacklist is hot-swappable; a changed trust mode is reported
/// and ignored until restart.
pub fn apply_reload(allow_when: AllowWhen, blacklist: &SharedBlacklist, new_config: &GateConfig) {
    let requested = new_config.trusted_headers.allow_when;
    if requested != allow_when {
        tracing::warn!(
            current = %allow_when,
            requested = %requested,
            "allow_when cannot change at runtime; restart to apply"
        );
    }

    let snapshot = new_config.trusted_headers.blacklist();
    metrics::record_blacklist_size(snapshot.len());
    blacklist.store(snapshot);
}

/// Consume config updates until the watcher goes away.
pub async fn run_reloads(
    mut updates: mpsc::UnboundedReceiver<GateConfig>,
    allow_when: AllowWhen,
    blacklist: SharedBlacklist,
) {
    while let Some(new_config) = updates.recv().await {
        apply_reload(allow_when, &blacklist, &new_config);
    }
    tracing::debug!("Config update channel closed");
}
