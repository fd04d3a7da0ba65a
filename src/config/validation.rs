//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (participants, intervals, timeouts)
//! - Enforce exactly one wallet credential
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: KeeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::KeeperConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &KeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.ledger.api_endpoint).is_err() {
        errors.push(ValidationError::new(
            "ledger.api_endpoint",
            format!("invalid URL '{}'", config.ledger.api_endpoint),
        ));
    }

    if config.ledger.network != "testnet" && config.ledger.network != "mainnet" {
        errors.push(ValidationError::new(
            "ledger.network",
            "must be 'testnet' or 'mainnet'",
        ));
    }

    if config.ledger.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "ledger.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.contracts.lottery_address.trim().is_empty() {
        errors.push(ValidationError::new(
            "contracts.lottery_address",
            "must not be empty",
        ));
    }

    if config.contracts.nft_address.trim().is_empty() {
        errors.push(ValidationError::new("contracts.nft_address", "must not be empty"));
    }

    let has_key = config
        .wallet
        .private_key
        .as_deref()
        .is_some_and(|k| !k.is_empty());
    let has_mnemonic = config
        .wallet
        .mnemonic
        .as_deref()
        .is_some_and(|m| !m.is_empty());
    match (has_key, has_mnemonic) {
        (false, false) => errors.push(ValidationError::new(
            "wallet",
            "one of private_key or mnemonic must be set",
        )),
        (true, true) => errors.push(ValidationError::new(
            "wallet",
            "private_key and mnemonic are mutually exclusive",
        )),
        _ => {}
    }

    if config.draw.min_participants < 1 {
        errors.push(ValidationError::new(
            "draw.min_participants",
            "must be at least 1",
        ));
    }

    if config.draw.max_participants < config.draw.min_participants {
        errors.push(ValidationError::new(
            "draw.max_participants",
            "must be greater than or equal to draw.min_participants",
        ));
    }

    if config.draw.interval_secs == 0 {
        errors.push(ValidationError::new("draw.interval_secs", "must be greater than 0"));
    }

    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }

    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "confirmation.timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.confirmation.retry_count == 0 {
        errors.push(ValidationError::new(
            "confirmation.retry_count",
            "must be at least 1",
        ));
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when the admin API is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
