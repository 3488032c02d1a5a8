//! FOXy staking withdraw step: amount validation, allowance check, gas
//! estimation and the wizard transition that follows.
//!
//! The chain provider, the portfolio store and the wizard controller are
//! collaborators behind traits ([`ChainApi`], [`PortfolioStore`],
//! [`WizardController`]); [`WithdrawalDecisionFlow`] orchestrates them.

pub mod amount;
pub mod chain;
pub mod flow;
pub mod form;
pub mod portfolio;
pub mod types;
pub mod wizard;

// Re-export primary types for convenient access.
pub use amount::{
    AmountError, fiat_to_crypto, from_base_units, instant_withdraw_fee, percent_of,
    to_base_units, validate_crypto, validate_fiat,
};
pub use chain::{ChainApi, ChainError, GasEstimate};
pub use flow::{AllowanceState, DecisionOutcome, WithdrawError, WithdrawalDecisionFlow};
pub use form::{FormField, FormInput, InputMode, WithdrawForm};
pub use portfolio::{AssetSnapshot, InMemoryPortfolio, PortfolioStore};
pub use types::{ContractPair, WithdrawRequest, WithdrawType};
pub use wizard::{
    ApprovePayload, WithdrawPayload, WizardController, WizardPayload, WizardState, WizardStep,
};
