//! Lottery keeper service.
//!
//! # Data Flow
//! ```text
//! scheduler tick / manual call
//!     → fresh contract snapshot (LedgerClient)
//!     → eligibility decision
//!     → Wallet builds and signs the message
//!     → LedgerClient submits it
//!     → ConfirmationMonitor waits for a terminal status
//!     → outcome logged, winner record fetched best-effort
//! ```

pub mod service;
pub mod types;

pub use service::LotteryService;
pub use types::{
    DrawDecision, DrawReceipt, LotteryError, LotteryServiceResult, NftContractUpdate,
    ServiceStatus, TxReceipt,
};
