//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! LotteryService::start
//!     → shutdown.rs (fresh Shutdown token for this lifecycle)
//!     → scheduler task, client calls, monitor polls subscribe to it
//!
//! LotteryService::stop / signals.rs (SIGINT, SIGTERM)
//!     → Shutdown::trigger
//!     → every suspension point observes the signal and returns
//! ```
//!
//! # Design Decisions
//! - One token per lifecycle, passed by reference, no global state
//! - Cancelling only stops local waiting; submitted transactions stay submitted

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
