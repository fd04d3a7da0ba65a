//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the keeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the lottery keeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KeeperConfig {
    /// Remote ledger API settings.
    pub ledger: LedgerConfig,

    /// Contract addresses the keeper operates on.
    pub contracts: ContractsConfig,

    /// Signing credentials.
    pub wallet: WalletCredentials,

    /// Draw scheduling and eligibility policy.
    pub draw: DrawConfig,

    /// Transaction confirmation polling and retries.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Remote ledger API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the JSON API; endpoint names are joined onto it.
    pub api_endpoint: String,

    /// Network name (`testnet` or `mainnet`).
    pub network: String,

    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://testnet.toncenter.com/api/v2/".to_string(),
            network: "testnet".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Contract addresses.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Lottery contract that receives draw and new-round messages.
    pub lottery_address: String,

    /// NFT collection the lottery mints prizes from.
    pub nft_address: String,
}

/// Wallet credentials. Exactly one of the two must be set.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletCredentials {
    /// Hex-encoded 32-byte seed or 64-byte keypair, optional `0x` prefix.
    pub private_key: Option<String>,

    /// Mnemonic phrase.
    pub mnemonic: Option<String>,
}

impl std::fmt::Debug for WalletCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletCredentials")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Draw policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Scheduler tick interval in seconds.
    pub interval_secs: u64,

    /// Fewest participants required before any draw.
    pub min_participants: u32,

    /// Participant count at which the scheduler draws automatically.
    pub max_participants: u32,

    /// Entry fee in nano units (echoed in status only).
    pub entry_fee: u64,

    /// Run the periodic scheduler after `start`.
    pub auto_draw: bool,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30 * 60,
            min_participants: 2,
            max_participants: 10,
            entry_fee: 100_000_000,
            auto_draw: true,
        }
    }
}

/// Confirmation monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Overall deadline for a single wait in seconds.
    pub timeout_secs: u64,

    /// Number of wait attempts per submission.
    pub retry_count: u32,

    /// Base delay for linear backoff between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            timeout_secs: 5 * 60,
            retry_count: 3,
            retry_delay_ms: 5_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (`pretty` or `json`).
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: String::new(),
        }
    }
}
