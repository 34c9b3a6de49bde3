//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake, client-auth requirement)
//!     → handshake.rs (facts recorded once, ConnectionContext)
//!     → connection.rs (connection ID)
//!     → Hand off to HTTP layer with the context attached to each request
//! ```
//!
//! # Design Decisions
//! - Handshake facts are written before the first request and never mutated
//! - Plaintext connections carry a context with no handshake facts

pub mod connection;
pub mod handshake;
pub mod tls;

pub use connection::ConnectionId;
pub use handshake::{ClientAuth, ConnectionContext, HandshakeInfo};
