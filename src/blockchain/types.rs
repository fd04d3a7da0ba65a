//! Ledger-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export LedgerConfig from config module to avoid duplication
pub use crate::config::schema::LedgerConfig;

/// Errors that can occur during wallet, ledger and confirmation operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Missing, conflicting or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Private key material could not be decoded.
    #[error("Invalid private key format: {0}")]
    InvalidKey(String),

    /// Private key decoded to an unsupported number of bytes.
    #[error(
        "Invalid private key length: expected {expected_seed} bytes (seed) or {expected_full} bytes (full key), got {actual} bytes"
    )]
    InvalidKeyLength {
        expected_seed: usize,
        expected_full: usize,
        actual: usize,
    },

    /// Credential kind is recognised but not supported.
    #[error("Unsupported credential: {0}")]
    UnsupportedCredential(String),

    /// Wallet used before `initialize`.
    #[error("Wallet not initialized")]
    NotInitialized,

    /// Every sequence number of this wallet has been handed out.
    #[error("Sequence numbers exhausted")]
    SequenceExhausted,

    /// Address does not fit the transaction's length prefix.
    #[error("Address too long: {len} bytes (max {max})")]
    AddressTooLong { len: usize, max: usize },

    /// HTTP connection or request failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Ledger answered with `ok: false`.
    #[error("Remote API error: {0}")]
    RemoteApi(String),

    /// Response envelope or required field was missing or of the wrong type.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Result payload did not match the expected domain shape.
    #[error("Schema mismatch for {what}: {reason}")]
    SchemaMismatch { what: &'static str, reason: String },

    /// Remote request exceeded its deadline.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Operation was cancelled by a shutdown signal.
    #[error("Operation cancelled")]
    Cancelled,

    /// Ledger reported the transaction as failed.
    #[error("Transaction {0} failed on-chain")]
    TransactionFailed(String),

    /// Transaction did not reach a terminal status in time.
    #[error("Transaction {hash} not confirmed after {secs} seconds")]
    ConfirmationTimeout { hash: String, secs: u64 },

    /// Every confirmation attempt ended without success.
    #[error("Transaction {hash} not confirmed after {attempts} attempts (last status: {last_status}): {source}")]
    ConfirmationExhausted {
        hash: String,
        attempts: u32,
        last_status: TxStatus,
        #[source]
        source: Box<BlockchainError>,
    },
}

impl BlockchainError {
    /// Whether this error is (or wraps) a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BlockchainError::Cancelled)
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction status as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// No matching transaction record yet.
    Pending,
    /// Record present with `success: true`.
    Success,
    /// Record present with `success: false`.
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxStatus::Pending => "pending",
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Successful terminal outcome of confirmation monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Transaction hash that was monitored.
    pub hash: String,
    /// Always `TxStatus::Success` for a returned confirmation.
    pub status: TxStatus,
    /// 1-based wait attempt that observed the success.
    pub attempts: u32,
}

/// Response envelope shared by every ledger endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiEnvelope {
    /// Collapse the envelope into a result.
    pub fn into_result(self) -> BlockchainResult<serde_json::Value> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(BlockchainError::RemoteApi(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Account-level information for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    pub balance: String,
    pub state: String,
}

/// Point-in-time snapshot of the lottery contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryContractInfo {
    pub owner: String,
    pub entry_fee: u64,
    pub max_participants: u32,
    pub current_round: u64,
    pub lottery_active: bool,
    pub participant_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_contract: Option<String>,
}

/// A participant entry of the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub address: String,
    pub amount: u64,
    pub timestamp: u64,
}

/// Winner record of a completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryResult {
    pub winner: String,
    pub nft_id: u64,
    pub timestamp: u64,
}
