//! Deadline and cancellation enforcement.
//!
//! # Responsibilities
//! - Wrap remote calls with a deadline
//! - Abort the in-flight future as soon as the lifecycle is cancelled
//! - Cancellable sleeps for pacing loops
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Cancellation wins ties with completion (biased select)
//! - Timeout and cancellation are distinct outcomes

use std::future::Future;
use std::time::Duration;

use crate::lifecycle::ShutdownSignal;

/// Why a guarded future did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The shutdown signal fired first.
    Cancelled,
    /// The deadline elapsed first.
    TimedOut,
}

/// Run `fut` until it completes, `deadline` elapses, or `signal` fires.
///
/// The future is dropped on timeout or cancellation, which aborts any
/// in-progress network operation it owns.
pub async fn with_deadline<F, T>(
    deadline: Duration,
    signal: &ShutdownSignal,
    fut: F,
) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = signal.cancelled() => Err(Interrupted::Cancelled),
        res = tokio::time::timeout(deadline, fut) => res.map_err(|_| Interrupted::TimedOut),
    }
}

/// Sleep for `duration` unless cancelled first.
///
/// Returns `false` if the signal fired.
pub async fn sleep_or_cancel(duration: Duration, signal: &ShutdownSignal) -> bool {
    tokio::select! {
        biased;
        _ = signal.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
