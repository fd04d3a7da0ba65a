//! Lottery service types and error definitions.

use serde::Serialize;
use thiserror::Error;

use crate::blockchain::{BlockchainError, LotteryResult, TxStatus};

/// Errors surfaced by the lottery service operations.
#[derive(Debug, Error)]
pub enum LotteryError {
    /// `start` called while already running.
    #[error("Lottery service is already running")]
    AlreadyRunning,

    /// Draw requested while the lottery is not accepting a draw.
    #[error("Lottery is not active")]
    LotteryNotActive,

    /// Draw requested before enough players joined.
    #[error("Not enough participants: {current} < {required}")]
    InsufficientParticipants { current: u32, required: u32 },

    /// New round requested while the current round is still active.
    #[error("Current round is still in progress; cannot start a new round")]
    RoundInProgress,

    /// Submitted transaction did not confirm successfully.
    #[error("Transaction {hash} did not succeed (status: {status}): {reason}")]
    TransactionFailed {
        hash: String,
        status: TxStatus,
        reason: String,
    },

    /// Wallet, ledger or cancellation error.
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

impl LotteryError {
    /// Whether the operation stopped because the service lifecycle was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LotteryError::Blockchain(e) if e.is_cancelled())
    }

    /// Whether the error is a precondition that retrying will not fix.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LotteryError::AlreadyRunning
                | LotteryError::LotteryNotActive
                | LotteryError::InsufficientParticipants { .. }
                | LotteryError::RoundInProgress
        )
    }
}

/// Result type for lottery service operations.
pub type LotteryServiceResult<T> = Result<T, LotteryError>;

/// Fixed-shape status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub auto_draw: bool,
    pub draw_interval_secs: u64,
    pub max_participants: u32,
    pub min_participants: u32,
    pub entry_fee: u64,
    pub wallet_address: String,
}

/// Outcome of one eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum DrawDecision {
    /// Lottery not active; nothing to do.
    Inactive,
    /// Fewer participants than the configured minimum.
    InsufficientParticipants { current: u32, required: u32 },
    /// Enough participants to draw, but below the auto-draw threshold.
    BelowThreshold { current: u32, threshold: u32 },
    /// A draw was submitted and confirmed.
    Drawn(DrawReceipt),
}

/// A submitted and confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub hash: String,
    pub seqno: u32,
    pub attempts: u32,
}

/// Result of a successful draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawReceipt {
    pub transaction: TxReceipt,
    pub round: u64,
    /// Winner record, if it could be fetched after confirmation.
    pub winner: Option<LotteryResult>,
}

/// Result of pointing the lottery at the configured NFT collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NftContractUpdate {
    /// The contract already referenced the configured collection.
    AlreadySet,
    /// A transaction updated it.
    Updated(TxReceipt),
}
