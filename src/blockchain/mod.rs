//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (private key, API endpoint)
//!     → wallet.rs (key loading, sequence numbers, signing)
//!     → transaction.rs (intent encoding, signed payload)
//!     → client.rs (JSON API with deadlines and cancellation)
//!     → monitor.rs (poll status until terminal, retry with backoff)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All remote calls have configurable timeouts
//! - Every suspension point observes the lifecycle shutdown signal

pub mod client;
pub mod monitor;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::LedgerClient;
pub use monitor::ConfirmationMonitor;
pub use transaction::{PayloadTag, SignedTransaction, TransactionIntent, DEFAULT_GAS_FEE};
pub use types::{
    AddressInfo, BlockchainError, BlockchainResult, Confirmation, LotteryContractInfo,
    LotteryResult, Participant, TxStatus,
};
pub use wallet::Wallet;
