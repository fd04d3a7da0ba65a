//! Transaction confirmation monitoring.
//!
//! # State Transitions
//! ```text
//! Pending → Success:   status query reports success
//! Pending → Failed:    status query reports failure
//! Pending → TimedOut:  overall deadline elapses
//! Pending → Cancelled: shutdown signal fires (no further polls)
//! ```
//!
//! Transport errors while polling keep the wait in `Pending`; only the
//! transitions above end it.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Confirmation, TxStatus};
use crate::config::ConfirmationConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::{linear_backoff, sleep_or_cancel, with_deadline, Interrupted};

/// Polls the ledger until a submitted transaction reaches a terminal status.
#[derive(Debug, Clone)]
pub struct ConfirmationMonitor {
    client: LedgerClient,
    poll_interval: Duration,
    timeout: Duration,
    retry_delay: Duration,
}

impl ConfirmationMonitor {
    /// Create a monitor from confirmation settings.
    pub fn new(client: LedgerClient, config: &ConfirmationConfig) -> Self {
        Self {
            client,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Override the single-wait deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait once for the transaction to succeed or fail.
    pub async fn wait_for_confirmation(
        &self,
        hash: &str,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<Confirmation> {
        let (_, result) = self.poll_until_terminal(hash, signal).await;
        result.map(|()| Confirmation {
            hash: hash.to_string(),
            status: TxStatus::Success,
            attempts: 1,
        })
    }

    /// Repeat [`wait_for_confirmation`](Self::wait_for_confirmation) up to
    /// `max_attempts` times with linear backoff between attempts.
    pub async fn wait_for_confirmation_with_retry(
        &self,
        hash: &str,
        max_attempts: u32,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<Confirmation> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            tracing::info!(hash = %hash, attempt = attempt, max = max_attempts, "Confirmation attempt");

            let (last_status, result) = self.poll_until_terminal(hash, signal).await;
            let err = match result {
                Ok(()) => {
                    return Ok(Confirmation {
                        hash: hash.to_string(),
                        status: TxStatus::Success,
                        attempts: attempt,
                    });
                }
                Err(BlockchainError::Cancelled) => return Err(BlockchainError::Cancelled),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                tracing::error!(
                    hash = %hash,
                    attempts = attempt,
                    last_status = %last_status,
                    error = %err,
                    "Confirmation failed after all attempts"
                );
                return Err(BlockchainError::ConfirmationExhausted {
                    hash: hash.to_string(),
                    attempts: attempt,
                    last_status,
                    source: Box::new(err),
                });
            }

            let delay = linear_backoff(attempt, self.retry_delay);
            tracing::warn!(
                hash = %hash,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Confirmation attempt failed, retrying"
            );

            if !sleep_or_cancel(delay, signal).await {
                return Err(BlockchainError::Cancelled);
            }
            attempt += 1;
        }
    }

    /// Returns the last observed status alongside the outcome.
    async fn poll_until_terminal(
        &self,
        hash: &str,
        signal: &ShutdownSignal,
    ) -> (TxStatus, BlockchainResult<()>) {
        let mut last_status = TxStatus::Pending;

        let polling = async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match self.client.get_transaction_status(hash, signal).await {
                    Ok(status) => {
                        last_status = status;
                        metrics::record_confirmation_poll(status_label(status));
                        match status {
                            TxStatus::Success => {
                                tracing::info!(hash = %hash, "Transaction confirmed");
                                return Ok(());
                            }
                            TxStatus::Failed => {
                                tracing::error!(hash = %hash, "Transaction failed on-chain");
                                return Err(BlockchainError::TransactionFailed(hash.to_string()));
                            }
                            TxStatus::Pending => {
                                tracing::debug!(hash = %hash, "Transaction pending");
                            }
                        }
                    }
                    Err(BlockchainError::Cancelled) => return Err(BlockchainError::Cancelled),
                    Err(e) => {
                        metrics::record_confirmation_poll("error");
                        tracing::warn!(hash = %hash, error = %e, "Status query failed, continuing");
                    }
                }
            }
        };

        let result = match with_deadline(self.timeout, signal, polling).await {
            Ok(outcome) => outcome,
            Err(Interrupted::Cancelled) => Err(BlockchainError::Cancelled),
            Err(Interrupted::TimedOut) => {
                tracing::warn!(hash = %hash, timeout_ms = self.timeout.as_millis() as u64, "Confirmation timed out");
                Err(BlockchainError::ConfirmationTimeout {
                    hash: hash.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if matches!(result, Err(BlockchainError::Cancelled)) {
            tracing::info!(hash = %hash, "Confirmation wait cancelled");
        }

        (last_status, result)
    }
}

fn status_label(status: TxStatus) -> &'static str {
    match status {
        TxStatus::Pending => "pending",
        TxStatus::Success => "success",
        TxStatus::Failed => "failed",
    }
}
