//! Shutdown coordination for the keeper.

use tokio::sync::watch;

/// Coordinator for cancelling everything started under one service lifecycle.
///
/// Backed by a watch channel so the triggered state is sticky: a signal
/// subscribed after `trigger` still observes the cancellation.
#[derive(Debug)]
pub struct Shutdown {
    /// Watch channel sender; `true` once triggered.
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Repeated calls are harmless.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `trigger` has been called.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to every suspension point.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether shutdown has already been requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested.
    ///
    /// If the coordinator is dropped without triggering, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_is_sticky() {
        let shutdown = Shutdown::new();
        let early = shutdown.subscribe();
        assert!(!early.is_triggered());

        shutdown.trigger();
        let late = shutdown.subscribe();

        assert!(early.is_triggered());
        assert!(late.is_triggered());
        tokio::time::timeout(Duration::from_millis(100), late.cancelled())
            .await
            .expect("late subscriber should observe the trigger");
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();

        let waiter = tokio::spawn(async move { signal.cancelled().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let signal = ShutdownSignal::never();
        let res = tokio::time::timeout(Duration::from_millis(50), signal.cancelled()).await;
        assert!(res.is_err());
        assert!(!signal.is_triggered());
    }
}
