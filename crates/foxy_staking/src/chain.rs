//! Chain provider contract used by the withdraw flow.
//!
//! Implementations talk to a node (or a wallet's provider); the flow only
//! needs allowance, two gas estimates and the current gas price.

use async_trait::async_trait;
use foxy_core::error_handler::{MessageCategory, classify_message};
use num_bigint::BigUint;

use crate::types::WithdrawType;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a chain provider may return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The instant withdraw reserve cannot cover the amount.
    #[error("Reserve error: {0}")]
    InsufficientReserve(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Chain provider unavailable")]
    Unavailable,

    #[error("Chain error: {0}")]
    Other(String),
}

impl ChainError {
    /// Map a raw provider message (revert reason, JSON-RPC error text) onto
    /// the taxonomy.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        match classify_message(&message) {
            MessageCategory::InsufficientReserve => Self::InsufficientReserve(message),
            MessageCategory::Network => Self::Rpc(message),
            MessageCategory::InsufficientFunds
            | MessageCategory::Reverted
            | MessageCategory::Unknown => Self::Other(message),
        }
    }

    pub fn is_insufficient_reserve(&self) -> bool {
        match self {
            Self::InsufficientReserve(_) => true,
            // Providers that did not go through `from_message`.
            Self::Rpc(msg) | Self::Other(msg) => {
                classify_message(msg) == MessageCategory::InsufficientReserve
            }
            Self::Unavailable => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Blockchain queries the withdraw step depends on. Raw amounts are integers
/// in the token's base units.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Amount of `token_contract` that `spender_contract` may spend for `owner`.
    async fn allowance(
        &self,
        token_contract: &str,
        spender_contract: &str,
        owner: &str,
    ) -> Result<BigUint, ChainError>;

    /// Gas limit for approving `spender_contract` on `token_contract`.
    async fn estimate_approve_gas(
        &self,
        token_contract: &str,
        spender_contract: &str,
        owner: &str,
    ) -> Result<u64, ChainError>;

    /// Gas limit for withdrawing `amount` base units from the staking contract.
    async fn estimate_withdraw_gas(
        &self,
        token_contract: &str,
        spender_contract: &str,
        amount: &BigUint,
        owner: &str,
        withdraw_type: WithdrawType,
    ) -> Result<u64, ChainError>;

    /// Current gas price in base fee-currency units (wei).
    async fn gas_price(&self) -> Result<u128, ChainError>;
}

// ---------------------------------------------------------------------------
// Gas estimate
// ---------------------------------------------------------------------------

/// Gas limit and price for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_limit: u64,
    pub gas_price: u128,
}

impl GasEstimate {
    pub fn new(gas_limit: u64, gas_price: u128) -> Self {
        Self {
            gas_limit,
            gas_price,
        }
    }

    /// `gas_price × gas_limit` in base fee-currency units.
    pub fn fee(&self) -> BigUint {
        BigUint::from(self.gas_price) * self.gas_limit
    }

    /// Fee as an integer string, the form carried in wizard payloads.
    pub fn fee_string(&self) -> String {
        self.fee().to_str_radix(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_message_detects_reserve() {
        let err = ChainError::from_message("execution reverted: Not enough funds in reserve");
        assert!(matches!(err, ChainError::InsufficientReserve(_)));
        assert!(err.is_insufficient_reserve());
        assert_eq!(
            err.to_string(),
            "Reserve error: execution reverted: Not enough funds in reserve"
        );
    }

    #[test]
    fn from_message_maps_network_and_other() {
        assert!(matches!(
            ChainError::from_message("connection reset by peer"),
            ChainError::Rpc(_)
        ));
        let other = ChainError::from_message("execution reverted");
        assert!(matches!(other, ChainError::Other(_)));
        assert!(!other.is_insufficient_reserve());
    }

    #[test]
    fn reserve_detected_in_unclassified_variants() {
        let err = ChainError::Rpc("-32000: Not enough funds in reserve".into());
        assert!(err.is_insufficient_reserve());
        assert!(!ChainError::Unavailable.is_insufficient_reserve());
    }

    #[test]
    fn fee_is_price_times_limit() {
        let estimate = GasEstimate::new(21_000, 30_000_000_000);
        assert_eq!(estimate.fee_string(), "630000000000000");
    }

    #[test]
    fn fee_does_not_overflow() {
        let estimate = GasEstimate::new(u64::MAX, u128::MAX);
        let expected = BigUint::from(u128::MAX) * BigUint::from(u64::MAX);
        assert_eq!(estimate.fee(), expected);
    }
}
