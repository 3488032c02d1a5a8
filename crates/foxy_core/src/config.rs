use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error_handler::FoxyError;

/// FOXy ERC-20 token on Ethereum mainnet.
const DEFAULT_TOKEN_CONTRACT: &str = "0xDc49108ce5C57bc3408c3A5E95F3d864eC386Ed3";
/// FOXy staking contract, the spender the token allowance is granted to.
const DEFAULT_STAKING_CONTRACT: &str = "0xee77aa3Fd23BbeBaf94386dD44b548e9a785ea4b";
const DEFAULT_ASSET_ID: &str = "eip155:1/erc20:0xdc49108ce5c57bc3408c3a5e95f3d864ec386ed3";

pub const DEFAULT_GENERIC_ERROR: &str = "Something went wrong. Please try again.";
pub const DEFAULT_RESERVE_ERROR: &str =
    "Not enough funds in the instant withdraw reserve. Try a delayed withdraw instead.";

/// User-facing texts shown when a withdraw estimate fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub generic: String,
    pub insufficient_reserve: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            generic: DEFAULT_GENERIC_ERROR.into(),
            insufficient_reserve: DEFAULT_RESERVE_ERROR.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FoxyConfig
// ---------------------------------------------------------------------------

/// Staking configuration stored at `~/.foxy/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoxyConfig {
    /// Token being withdrawn (the allowance is checked on this contract).
    pub token_contract: String,
    /// Staking contract that spends the token on withdraw.
    pub staking_contract: String,
    /// Portfolio asset id of the staked token.
    pub asset_id: String,
    /// Fraction of the amount charged for instant withdraws, e.g. `0.003`.
    pub instant_fee_percentage: Decimal,
    pub messages: ErrorMessages,
    pub log_level: String,
    /// Upper bound on notifications kept in memory.
    pub max_notifications: usize,
}

impl Default for FoxyConfig {
    fn default() -> Self {
        Self {
            token_contract: DEFAULT_TOKEN_CONTRACT.into(),
            staking_contract: DEFAULT_STAKING_CONTRACT.into(),
            asset_id: DEFAULT_ASSET_ID.into(),
            instant_fee_percentage: Decimal::ZERO,
            messages: ErrorMessages::default(),
            log_level: "info".into(),
            max_notifications: 100,
        }
    }
}

impl FoxyConfig {
    /// Returns the base directory: `~/.foxy/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".foxy"))
    }

    /// Returns the config file path: `~/.foxy/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.foxy/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Load and validate a config file. Fails on missing, unreadable, corrupt
    /// or invalid files.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load config from a JSON file, or return defaults if the file is
    /// missing, corrupt or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Unusable config file, using defaults: {e:#}");
                Self::default()
            }
        }
    }

    /// Save the config to a JSON file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Check contract addresses, the asset id and the instant fee.
    pub fn validate(&self) -> Result<(), FoxyError> {
        for (name, address) in [
            ("token_contract", &self.token_contract),
            ("staking_contract", &self.staking_contract),
        ] {
            if !is_evm_address(address) {
                return Err(FoxyError::Config(format!("{name} is not an address: {address}")));
            }
        }
        if self.asset_id.trim().is_empty() {
            return Err(FoxyError::Config("asset_id must not be empty".into()));
        }
        if self.instant_fee_percentage < Decimal::ZERO || self.instant_fee_percentage >= Decimal::ONE
        {
            return Err(FoxyError::Config(format!(
                "instant_fee_percentage must be in [0, 1), got {}",
                self.instant_fee_percentage
            )));
        }
        Ok(())
    }
}

/// `0x` followed by 20 hex-encoded bytes. Checksum casing is not verified.
pub fn is_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) if body.len() == 40 => hex::decode(body).is_ok(),
        _ => false,
    }
}
