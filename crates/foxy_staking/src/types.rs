use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::AmountError;

/// How the staking contract pays out a withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawType {
    /// Queued withdraw, claimable after the cooldown. Any amount.
    #[default]
    Delayed,
    /// Paid out immediately from the reserve. Always the whole balance.
    Instant,
}

impl WithdrawType {
    pub fn label(&self) -> &'static str {
        match self {
            WithdrawType::Delayed => "Delayed",
            WithdrawType::Instant => "Instant",
        }
    }

    /// Whether the user may type an amount, or the amount is implied.
    pub fn allows_manual_amount(&self) -> bool {
        matches!(self, WithdrawType::Delayed)
    }
}

impl fmt::Display for WithdrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Token and spender addresses the allowance and estimates are queried
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractPair {
    pub token: String,
    pub spender: String,
}

impl ContractPair {
    pub fn new(token: impl Into<String>, spender: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            spender: spender.into(),
        }
    }

    pub fn from_config(config: &foxy_core::FoxyConfig) -> Self {
        Self::new(&config.token_contract, &config.staking_contract)
    }
}

/// Amount and type the user submitted on the withdraw step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub crypto_amount: Decimal,
    pub withdraw_type: WithdrawType,
}

impl WithdrawRequest {
    /// Build a request from an already-parsed amount. Rejects negative values.
    pub fn new(crypto_amount: Decimal, withdraw_type: WithdrawType) -> Result<Self, AmountError> {
        if crypto_amount.is_sign_negative() && !crypto_amount.is_zero() {
            return Err(AmountError::Negative);
        }
        Ok(Self {
            crypto_amount,
            withdraw_type,
        })
    }

    /// Parse a decimal string as typed by the user, e.g. `"50"` or `"0.25"`.
    pub fn parse(crypto_amount: &str, withdraw_type: WithdrawType) -> Result<Self, AmountError> {
        let trimmed = crypto_amount.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Self::new(amount, withdraw_type)
    }
}
