//! Host blacklist for trusted connections.
//!
//! # Responsibilities
//! - Hold an immutable, case-normalized snapshot of blacklisted hosts
//! - Extract the declared host from a request
//! - Publish new snapshots atomically on config reload
//!
//! # Design Decisions
//! - Exact match after ASCII lower-casing; no port stripping, no suffix rules
//! - Readers load a whole snapshot per request, never a half-updated list
//! - A failing source degrades to "not blacklisted"

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::{header::HOST, Request};

/// Immutable set of hosts whose proxy headers are always stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBlacklist {
    hosts: HashSet<String>,
}

impl HostBlacklist {
    /// Build a snapshot from configured entries. Blank entries are ignored.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { hosts }
    }

    /// Exact, ASCII case-insensitive lookup.
    pub fn matches(&self, host: &str) -> bool {
        if host.is_empty() || self.is_empty() {
            return false;
        }
        self.hosts.contains(&host.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// The request's declared host, or `""` when it has none.
///
/// Reads the Host header first. HTTP/2 requests carry `:authority` in the URI
/// instead, so the URI authority is used verbatim when no Host header is
/// present. A Host header that is not visible ASCII counts as absent.
pub fn request_host<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
}

/// True if the request's declared host is in the blacklist.
pub fn is_blacklisted<B>(req: &Request<B>, blacklist: &HostBlacklist) -> bool {
    blacklist.matches(request_host(req))
}

/// Error reported by a blacklist source that cannot produce a snapshot.
#[derive(Debug, thiserror::Error)]
#[error("host blacklist unavailable: {0}")]
pub struct SourceError(pub String);

/// Supplies the current blacklist snapshot.
pub trait BlacklistSource: Send + Sync {
    fn load(&self) -> Result<Arc<HostBlacklist>, SourceError>;
}

impl BlacklistSource for Arc<HostBlacklist> {
    fn load(&self) -> Result<Arc<HostBlacklist>, SourceError> {
        Ok(Arc::clone(self))
    }
}

/// Blacklist snapshot that can be replaced while requests are in flight.
#[derive(Debug, Clone)]
pub struct SharedBlacklist {
    swap: Arc<ArcSwap<HostBlacklist>>,
}

impl SharedBlacklist {
    pub fn new(blacklist: HostBlacklist) -> Self {
        Self {
            swap: Arc::new(ArcSwap::from_pointee(blacklist)),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<HostBlacklist> {
        self.swap.load_full()
    }

    /// Publish a new snapshot. Later loads observe it in full.
    pub fn store(&self, blacklist: HostBlacklist) {
        tracing::info!(entries = blacklist.len(), "Host blacklist updated");
        self.swap.store(Arc::new(blacklist));
    }
}

impl Default for SharedBlacklist {
    fn default() -> Self {
        Self::new(HostBlacklist::default())
    }
}

impl BlacklistSource for SharedBlacklist {
    fn load(&self) -> Result<Arc<HostBlacklist>, SourceError> {
        Ok(self.snapshot())
    }
}
