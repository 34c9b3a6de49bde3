//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → net::tls acceptor (ConnectionContext per connection)
//!     → server.rs (Axum router, TraceLayer)
//!     → gate (strip untrusted proxy headers)
//!     → echo stage (reports surviving headers)
//! ```

pub mod server;

pub use server::{build_router, HttpServer, ServerError};
