//! Per-request trust decision.
//!
//! # Decision Flow
//! ```text
//! request + connection context
//!     → policy check (AllowWhen × handshake facts)
//!         Untrusted → strip → forward
//!         Trusted   → blacklist check
//!                         match    → strip → forward
//!                         no match → forward unchanged
//! ```
//!
//! # Design Decisions
//! - Infallible: missing host, missing handshake and source errors all
//!   resolve to a defined branch
//! - Fail closed on transport trust, fail open on the blacklist lookup

use std::sync::Arc;

use axum::http::Request;

use crate::gate::blacklist::{is_blacklisted, request_host, BlacklistSource, HostBlacklist};
use crate::gate::policy::{AllowWhen, Trust};
use crate::gate::sanitize::strip_proxy_headers;
use crate::net::handshake::ConnectionContext;
use crate::observability::metrics;

/// Why proxy headers were stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripReason {
    /// The connection failed the transport trust check.
    Untrusted,
    /// The connection was trusted but the host is blacklisted.
    Blacklisted,
}

/// Outcome of running a request through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Headers left as the client sent them.
    Passthrough,
    Stripped(StripReason),
}

impl GateDecision {
    pub fn is_stripped(self) -> bool {
        matches!(self, GateDecision::Stripped(_))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GateDecision::Passthrough => "passthrough",
            GateDecision::Stripped(StripReason::Untrusted) => "stripped_untrusted",
            GateDecision::Stripped(StripReason::Blacklisted) => "stripped_blacklisted",
        }
    }
}

/// Decides, per request, whether client-supplied proxy headers survive.
#[derive(Clone)]
pub struct RequestGate {
    allow_when: AllowWhen,
    blacklist: Arc<dyn BlacklistSource>,
}

impl RequestGate {
    /// Create a gate with a fixed trust mode and a blacklist source.
    pub fn new(allow_when: AllowWhen, blacklist: impl BlacklistSource + 'static) -> Self {
        Self {
            allow_when,
            blacklist: Arc::new(blacklist),
        }
    }

    /// Run the trust decision for one request, stripping headers in place.
    ///
    /// `conn` is `None` when the request carries no connection context, which
    /// is treated the same as a connection without handshake facts.
    pub fn process<B>(&self, conn: Option<&ConnectionContext>, req: &mut Request<B>) -> GateDecision {
        let handshake = conn.and_then(ConnectionContext::handshake);

        let decision = match self.allow_when.evaluate(handshake) {
            Trust::Untrusted => {
                self.strip(req);
                GateDecision::Stripped(StripReason::Untrusted)
            }
            Trust::Trusted => {
                let blacklist = self.current_blacklist();
                self.check_blacklist(req, &blacklist)
            }
        };

        tracing::debug!(
            connection_id = conn.map(|c| c.id().as_u64()),
            allow_when = %self.allow_when,
            client_auth = ?handshake.map(|h| h.client_auth),
            host = %request_host(req),
            decision = decision.as_str(),
            "Proxy header decision"
        );
        metrics::record_decision(decision);

        decision
    }

    /// Strip proxy headers if the request's host is blacklisted.
    pub fn check_blacklist<B>(&self, req: &mut Request<B>, blacklist: &HostBlacklist) -> GateDecision {
        if is_blacklisted(req, blacklist) {
            self.strip(req);
            GateDecision::Stripped(StripReason::Blacklisted)
        } else {
            GateDecision::Passthrough
        }
    }

    /// Remove all proxy-provenance headers from the request.
    pub fn strip<B>(&self, req: &mut Request<B>) {
        let removed = strip_proxy_headers(req.headers_mut());
        if removed > 0 {
            tracing::trace!(removed, "Stripped proxy headers");
        }
    }

    fn current_blacklist(&self) -> Arc<HostBlacklist> {
        match self.blacklist.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Host blacklist unavailable, skipping blacklist check");
                Arc::new(HostBlacklist::default())
            }
        }
    }
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("allow_when", &self.allow_when)
            .finish_non_exhaustive()
    }
}
