//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and config subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (decision counters, blacklist gauge)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
