//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Wallet, ledger client, monitor, lottery service produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Logging and metrics never block or fail the core operations

pub mod logging;
pub mod metrics;
