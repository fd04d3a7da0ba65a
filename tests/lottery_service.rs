//! Lottery service against the mock ledger.

mod common;

use common::{contract_info, keeper_config, MockLedger, StatusReply, NFT_ADDRESS};
use lottery_keeper::blockchain::TxStatus;
use lottery_keeper::lottery::{DrawDecision, LotteryError, NftContractUpdate};
use lottery_keeper::LotteryService;
use serde_json::json;
use std::time::Duration;

async fn setup() -> (MockLedger, LotteryService) {
    let ledger = MockLedger::start().await;
    ledger.set_default_status(StatusReply::Success);
    let service = LotteryService::new(keeper_config(&ledger.url)).unwrap();
    (ledger, service)
}

#[tokio::test]
async fn test_check_and_draw_skips_inactive_lottery() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(false, 10, 1));

    let decision = service.check_and_draw().await.unwrap();
    assert_eq!(decision, DrawDecision::Inactive);
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_check_and_draw_skips_insufficient_participants() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 1, 1));

    let decision = service.check_and_draw().await.unwrap();
    assert_eq!(
        decision,
        DrawDecision::InsufficientParticipants { current: 1, required: 2 }
    );
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_check_and_draw_waits_for_threshold() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 5, 1));

    let decision = service.check_and_draw().await.unwrap();
    assert_eq!(decision, DrawDecision::BelowThreshold { current: 5, threshold: 10 });
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_check_and_draw_draws_at_threshold() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 10, 4));
    ledger.set_winner(json!({ "winner": "EQPlayer7", "nft_id": 4, "timestamp": 1_700_000_000u64 }));

    let decision = service.check_and_draw().await.unwrap();
    let receipt = match decision {
        DrawDecision::Drawn(receipt) => receipt,
        other => panic!("expected a draw, got {:?}", other),
    };

    assert_eq!(receipt.round, 4);
    assert_eq!(receipt.transaction.hash, "tx-1");
    assert_eq!(receipt.transaction.seqno, 1);
    assert_eq!(receipt.transaction.attempts, 1);
    assert_eq!(receipt.winner.map(|w| w.winner), Some("EQPlayer7".to_string()));
    assert_eq!(ledger.submissions().len(), 1);
}

#[tokio::test]
async fn test_draw_rejects_insufficient_participants() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(json!({
        "owner": "EQOwner",
        "entry_fee": 100_000_000u64,
        "max_participants": 10,
        "current_round": 1,
        "lottery_active": true,
        "participant_count": 1,
    }));

    let err = service.send_draw_winner().await.unwrap_err();
    assert!(matches!(
        err,
        LotteryError::InsufficientParticipants { current: 1, required: 2 }
    ));
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_draw_rejects_inactive_lottery() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(false, 0, 1));

    let err = service.send_draw_winner().await.unwrap_err();
    assert!(matches!(err, LotteryError::LotteryNotActive));
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_manual_draw_without_winner_record() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 3, 2));

    let receipt = service.send_draw_winner().await.unwrap();
    assert_eq!(receipt.round, 2);
    assert!(receipt.winner.is_none());
    assert_eq!(ledger.submissions().len(), 1);
}

#[tokio::test]
async fn test_new_round_rejected_while_active() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 3, 2));

    let err = service.send_start_new_round().await.unwrap_err();
    assert!(matches!(err, LotteryError::RoundInProgress));
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_new_round_after_finished_round() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(false, 0, 2));

    let receipt = service.send_start_new_round().await.unwrap();
    assert_eq!(receipt.hash, "tx-1");
    assert_eq!(ledger.submissions().len(), 1);
}

#[tokio::test]
async fn test_failed_transaction_surfaces_status() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(false, 0, 2));
    ledger.set_default_status(StatusReply::Failed);

    let err = service.send_start_new_round().await.unwrap_err();
    match err {
        LotteryError::TransactionFailed { hash, status, .. } => {
            assert_eq!(hash, "tx-1");
            assert_eq!(status, TxStatus::Failed);
        }
        other => panic!("expected transaction failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sequence_numbers_advance_across_operations() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(false, 0, 2));

    let first = service.send_start_new_round().await.unwrap();
    let second = service.send_start_new_round().await.unwrap();
    assert_eq!(first.seqno, 1);
    assert_eq!(second.seqno, 2);
    assert_eq!(ledger.submissions().len(), 2);
}

#[tokio::test]
async fn test_set_nft_contract() {
    let (ledger, service) = setup().await;

    let mut info = contract_info(true, 0, 1);
    info["nft_contract"] = json!(NFT_ADDRESS);
    ledger.set_contract_info(info);
    assert_eq!(
        service.send_set_nft_contract().await.unwrap(),
        NftContractUpdate::AlreadySet
    );
    assert!(ledger.submissions().is_empty());

    ledger.set_contract_info(contract_info(true, 0, 1));
    match service.send_set_nft_contract().await.unwrap() {
        NftContractUpdate::Updated(receipt) => assert_eq!(receipt.hash, "tx-1"),
        other => panic!("expected update, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_passthroughs() {
    let (ledger, service) = setup().await;
    ledger.set_contract_info(contract_info(true, 6, 3));

    let info = service.get_contract_info().await.unwrap();
    assert_eq!(info.participant_count, 6);
    assert_eq!(service.get_contract_balance().await.unwrap(), 5_000_000_000);
    assert_eq!(service.get_participant(2).await.unwrap().address, "EQPlayer2");
    let account = service.get_address_information("EQWho").await.unwrap();
    assert_eq!(account.address, "EQWho");
}

#[tokio::test]
async fn test_stop_cancels_in_flight_confirmation() {
    let ledger = MockLedger::start().await;
    ledger.set_contract_info(contract_info(false, 0, 2));
    let mut config = keeper_config(&ledger.url);
    config.confirmation.timeout_secs = 30;
    let service = LotteryService::new(config).unwrap();
    service.start().await.unwrap();

    let background = service.clone();
    let task = tokio::spawn(async move { background.send_start_new_round().await });
    tokio::time::sleep(Duration::from_millis(150)).await;

    service.stop().await;
    let err = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("confirmation wait should stop promptly")
        .unwrap()
        .unwrap_err();
    assert!(err.is_cancelled(), "got {:?}", err);
    assert_eq!(ledger.submissions().len(), 1);

    // Later calls run under a fresh lifecycle.
    ledger.set_default_status(StatusReply::Success);
    assert!(service.send_start_new_round().await.is_ok());
}

#[tokio::test]
async fn test_scheduler_draws_when_threshold_reached() {
    let ledger = MockLedger::start().await;
    ledger.set_default_status(StatusReply::Success);
    ledger.set_contract_info(contract_info(true, 10, 1));
    let mut config = keeper_config(&ledger.url);
    config.draw.auto_draw = true;
    config.draw.interval_secs = 1;
    let service = LotteryService::new(config).unwrap();

    service.start().await.unwrap();
    assert!(ledger.submissions().is_empty());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while ledger.submissions().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    service.stop().await;

    assert!(!ledger.submissions().is_empty());
    assert!(!service.is_running().await);
}

#[tokio::test]
async fn test_start_twice_and_repeated_stop() {
    let (_ledger, service) = setup().await;

    service.start().await.unwrap();
    assert!(matches!(service.start().await, Err(LotteryError::AlreadyRunning)));
    assert!(service.get_status().await.running);

    service.stop().await;
    service.stop().await;
    assert!(!service.get_status().await.running);
}
