//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::KeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `wallet.private_key`.
pub const PRIVATE_KEY_ENV_VAR: &str = "KEEPER_WALLET_PRIVATE_KEY";

/// Environment variable overriding `wallet.mnemonic`.
pub const MNEMONIC_ENV_VAR: &str = "KEEPER_WALLET_MNEMONIC";

/// Environment variable overriding `observability.log_level`.
pub const LOG_LEVEL_ENV_VAR: &str = "KEEPER_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<KeeperConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse TOML, apply overrides from `lookup`, and validate.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<KeeperConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: KeeperConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_overrides(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply secret and log-level overrides. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut KeeperConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(key) = get(PRIVATE_KEY_ENV_VAR) {
        config.wallet.private_key = Some(key);
    }
    if let Some(mnemonic) = get(MNEMONIC_ENV_VAR) {
        config.wallet.mnemonic = Some(mnemonic);
    }
    if let Some(level) = get(LOG_LEVEL_ENV_VAR) {
        config.observability.log_level = level;
    }
}
