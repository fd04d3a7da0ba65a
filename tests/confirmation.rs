//! Confirmation monitor against the mock ledger.

mod common;

use common::{MockLedger, StatusReply};
use lottery_keeper::blockchain::{BlockchainError, ConfirmationMonitor, LedgerClient, TxStatus};
use lottery_keeper::lifecycle::{Shutdown, ShutdownSignal};
use std::time::{Duration, Instant};

fn monitor_for(ledger: &MockLedger) -> ConfirmationMonitor {
    let config = common::keeper_config(&ledger.url);
    let client = LedgerClient::new(config.ledger).unwrap();
    ConfirmationMonitor::new(client, &config.confirmation)
}

#[tokio::test]
async fn test_pending_then_success() {
    let ledger = MockLedger::start().await;
    ledger.script_statuses(&[StatusReply::Pending, StatusReply::Pending]);
    ledger.set_default_status(StatusReply::Success);

    let confirmation = monitor_for(&ledger)
        .wait_for_confirmation("tx-1", &ShutdownSignal::never())
        .await
        .unwrap();

    assert_eq!(confirmation.status, TxStatus::Success);
    assert_eq!(confirmation.attempts, 1);
    assert_eq!(ledger.status_queries(), 3);
}

#[tokio::test]
async fn test_failed_record_ends_wait() {
    let ledger = MockLedger::start().await;
    ledger.script_statuses(&[StatusReply::Pending]);
    ledger.set_default_status(StatusReply::Failed);

    let err = monitor_for(&ledger)
        .wait_for_confirmation("tx-1", &ShutdownSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(err, BlockchainError::TransactionFailed(ref h) if h == "tx-1"));
    assert_eq!(ledger.status_queries(), 2);
}

#[tokio::test]
async fn test_transport_errors_keep_polling() {
    let ledger = MockLedger::start().await;
    ledger.script_statuses(&[StatusReply::HttpError, StatusReply::ApiError]);
    ledger.set_default_status(StatusReply::Success);

    let confirmation = monitor_for(&ledger)
        .wait_for_confirmation("tx-1", &ShutdownSignal::never())
        .await
        .unwrap();
    assert_eq!(confirmation.status, TxStatus::Success);
}

#[tokio::test]
async fn test_timeout_while_pending() {
    let ledger = MockLedger::start().await;
    let monitor = monitor_for(&ledger).with_timeout(Duration::from_millis(150));

    let err = monitor
        .wait_for_confirmation("tx-1", &ShutdownSignal::never())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::ConfirmationTimeout { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_cancel_mid_poll_returns_promptly() {
    let ledger = MockLedger::start().await;
    let mut config = common::keeper_config(&ledger.url);
    config.confirmation.poll_interval_ms = 500;
    config.confirmation.timeout_secs = 30;
    let client = LedgerClient::new(config.ledger).unwrap();
    let monitor = ConfirmationMonitor::new(client, &config.confirmation);

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let started = Instant::now();

    let wait = tokio::spawn(async move { monitor.wait_for_confirmation("tx-1", &signal).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let err = wait.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(ledger.status_queries(), 1);
}

#[tokio::test]
async fn test_retry_exhausts_all_attempts() {
    let ledger = MockLedger::start().await;
    ledger.set_default_status(StatusReply::Failed);

    let err = monitor_for(&ledger)
        .wait_for_confirmation_with_retry("tx-1", 3, &ShutdownSignal::never())
        .await
        .unwrap_err();

    match err {
        BlockchainError::ConfirmationExhausted {
            attempts,
            last_status,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_status, TxStatus::Failed);
        }
        other => panic!("expected exhausted, got {:?}", other),
    }
    assert_eq!(ledger.status_queries(), 3);
}

#[tokio::test]
async fn test_retry_against_erroring_endpoint() {
    let ledger = MockLedger::start().await;
    ledger.set_default_status(StatusReply::HttpError);
    let monitor = monitor_for(&ledger).with_timeout(Duration::from_millis(100));

    let err = monitor
        .wait_for_confirmation_with_retry("tx-1", 3, &ShutdownSignal::never())
        .await
        .unwrap_err();

    match err {
        BlockchainError::ConfirmationExhausted {
            attempts, source, ..
        } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, BlockchainError::ConfirmationTimeout { .. }));
        }
        other => panic!("expected exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_succeeds_on_second_attempt() {
    let ledger = MockLedger::start().await;
    ledger.script_statuses(&[StatusReply::Failed]);
    ledger.set_default_status(StatusReply::Success);

    let confirmation = monitor_for(&ledger)
        .wait_for_confirmation_with_retry("tx-1", 3, &ShutdownSignal::never())
        .await
        .unwrap();

    assert_eq!(confirmation.attempts, 2);
    assert_eq!(confirmation.status, TxStatus::Success);
}

#[tokio::test]
async fn test_cancel_during_retry_backoff() {
    let ledger = MockLedger::start().await;
    ledger.set_default_status(StatusReply::Failed);
    let mut config = common::keeper_config(&ledger.url);
    config.confirmation.retry_delay_ms = 5_000;
    let client = LedgerClient::new(config.ledger).unwrap();
    let monitor = ConfirmationMonitor::new(client, &config.confirmation);

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let wait = tokio::spawn(async move {
        monitor.wait_for_confirmation_with_retry("tx-1", 3, &signal).await
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.trigger();

    let err = tokio::time::timeout(Duration::from_secs(1), wait)
        .await
        .expect("retry loop should observe cancellation")
        .unwrap()
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(ledger.status_queries(), 1);
}
