//! Trusted proxy header gate.
//!
//! # Data Flow
//! ```text
//! Request on connection (ConnectionContext extension)
//!     → layer.rs (tower middleware, one call per request)
//!     → handler.rs (decision: policy, then blacklist)
//!         → policy.rs (AllowWhen × handshake facts → Trust)
//!         → blacklist.rs (declared host ∈ snapshot?)
//!         → sanitize.rs (drop every proxy-provenance header)
//!     → next stage sees the sanitized request
//! ```
//!
//! # Design Decisions
//! - Trust mode fixed at construction; blacklist swapped atomically on reload
//! - Synchronous, no I/O: safe to run inline on the connection's task
//! - Strip is all-or-nothing over the fixed header set

pub mod blacklist;
pub mod handler;
pub mod layer;
pub mod policy;
pub mod sanitize;

pub use blacklist::{BlacklistSource, HostBlacklist, SharedBlacklist};
pub use handler::{GateDecision, RequestGate, StripReason};
pub use layer::{TrustedHeaders, TrustedHeadersLayer};
pub use policy::{AllowWhen, Trust};
pub use sanitize::{strip_proxy_headers, PROXY_HEADERS};
