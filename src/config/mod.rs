//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → KeeperConfig (validated, immutable)
//!     → shared via Arc with the lottery service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Wallet secrets can come from the environment instead of the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, ConfirmationConfig, ContractsConfig, DrawConfig, KeeperConfig, LedgerConfig,
    ObservabilityConfig, WalletCredentials,
};
