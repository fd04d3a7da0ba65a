//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote call:
//!     → timeouts.rs (deadline + cancellation around the request)
//! Confirmation retry:
//!     → backoff.rs (linear delay between wait attempts)
//!     → timeouts.rs (cancellable sleep)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries never re-submit a transaction, they only re-poll its status

pub mod backoff;
pub mod timeouts;

pub use backoff::linear_backoff;
pub use timeouts::{sleep_or_cancel, with_deadline, Interrupted};
