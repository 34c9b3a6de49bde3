//! Per-process connection numbering.
//!
//! Every accepted connection is numbered once, and the number follows its
//! requests into gate decision logs and the echo stage.

use std::sync::atomic::{AtomicU64, Ordering};

// Only uniqueness matters, so increments are relaxed.
static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically assigned connection number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
