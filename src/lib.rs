//! Trusted proxy header gate for an edge reverse proxy.
//!
//! Decides, for every inbound request, whether client-supplied proxy
//! provenance headers (`X-Forwarded-For` and friends) may be trusted or must
//! be stripped before the request reaches the routing pipeline.

pub mod config;
pub mod gate;
pub mod http;
pub mod net;
pub mod observability;

pub use config::GateConfig;
pub use gate::{AllowWhen, GateDecision, RequestGate, TrustedHeadersLayer};
pub use http::HttpServer;
