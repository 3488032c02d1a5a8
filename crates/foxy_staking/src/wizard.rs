use foxy_core::FoxyConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::WithdrawType;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Which step of the withdraw wizard the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Withdraw,
    Approve,
    Confirm,
    Status,
}

impl WizardStep {
    /// Zero-based index for a stepper component.
    pub fn index(self) -> usize {
        match self {
            Self::Withdraw => 0,
            Self::Approve => 1,
            Self::Confirm => 2,
            Self::Status => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Withdraw => "Withdraw",
            Self::Approve => "Approve",
            Self::Confirm => "Confirm",
            Self::Status => "Status",
        }
    }

    /// Whether the wizard may move from `self` to `target`.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Withdraw, Self::Approve)
                | (Self::Withdraw, Self::Confirm)
                | (Self::Approve, Self::Confirm)
                | (Self::Confirm, Self::Status)
        )
    }

    /// The step "back" returns to, if any. Status is final.
    fn prev(self) -> Option<Self> {
        match self {
            Self::Withdraw | Self::Status => None,
            Self::Approve | Self::Confirm => Some(Self::Withdraw),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Withdraw details carried from the amount step to Confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPayload {
    pub crypto_amount: Decimal,
    pub fiat_amount: Decimal,
    pub withdraw_type: WithdrawType,
    /// Withdraw fee in base fee-currency units, set once estimated.
    pub estimated_gas_crypto: Option<String>,
}

/// Approval details carried to the Approve step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovePayload {
    /// Approval fee in base fee-currency units.
    pub estimated_gas_crypto: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardPayload {
    Withdraw(WithdrawPayload),
    Approve(ApprovePayload),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Operations a wizard step may perform on the shared wizard state.
pub trait WizardController: Send {
    /// Address of the connected account, if any.
    fn user_address(&self) -> Option<&str>;

    fn is_loading(&self) -> bool;

    fn set_loading(&mut self, loading: bool);

    fn set_payload(&mut self, payload: WizardPayload);

    /// Move to `step`. Returns `false` if the move is not allowed from the
    /// current step, in which case nothing changes.
    fn advance(&mut self, step: WizardStep) -> bool;
}

/// State shared by the steps of one withdraw wizard instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub user_address: Option<String>,
    pub loading: bool,
    /// Instant withdraw fee as a fraction, e.g. `0.003`.
    pub foxy_fee_percentage: Decimal,
    pub withdraw: Option<WithdrawPayload>,
    pub approve: Option<ApprovePayload>,
}

impl WizardState {
    /// A wizard at the Withdraw step with nothing entered yet.
    pub fn new(user_address: Option<String>, foxy_fee_percentage: Decimal) -> Self {
        Self {
            current_step: WizardStep::Withdraw,
            user_address,
            loading: false,
            foxy_fee_percentage,
            withdraw: None,
            approve: None,
        }
    }

    /// A fresh wizard using the configured instant withdraw fee.
    pub fn from_config(config: &FoxyConfig, user_address: Option<String>) -> Self {
        Self::new(user_address, config.instant_fee_percentage)
    }

    /// Go back to the previous step, keeping entered data.
    /// Returns `true` if the step actually changed.
    pub fn go_back(&mut self) -> bool {
        if self.loading {
            return false;
        }
        if let Some(prev) = self.current_step.prev() {
            self.current_step = prev;
            return true;
        }
        false
    }

    /// Reset to the Withdraw step, keeping the account and fee settings.
    pub fn reset(&mut self) {
        *self = Self::new(self.user_address.take(), self.foxy_fee_percentage);
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == WizardStep::Status
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(None, Decimal::ZERO)
    }
}

impl WizardController for WizardState {
    fn user_address(&self) -> Option<&str> {
        self.user_address.as_deref().filter(|a| !a.is_empty())
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_payload(&mut self, payload: WizardPayload) {
        match payload {
            WizardPayload::Withdraw(withdraw) => self.withdraw = Some(withdraw),
            WizardPayload::Approve(approve) => self.approve = Some(approve),
        }
    }

    fn advance(&mut self, step: WizardStep) -> bool {
        if !self.current_step.can_transition_to(step) {
            warn!(from = ?self.current_step, to = ?step, "refusing invalid wizard transition");
            return false;
        }
        debug!(from = ?self.current_step, to = ?step, "wizard step changed");
        self.current_step = step;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn withdraw_payload() -> WithdrawPayload {
        WithdrawPayload {
            crypto_amount: Decimal::from(50),
            fiat_amount: Decimal::from(5),
            withdraw_type: WithdrawType::Delayed,
            estimated_gas_crypto: Some("630000000000000".into()),
        }
    }

    #[test]
    fn new_starts_at_withdraw() {
        let state = WizardState::new(Some("0xabc".into()), Decimal::from_str("0.003").unwrap());
        assert_eq!(state.current_step, WizardStep::Withdraw);
        assert!(!state.loading);
        assert!(state.withdraw.is_none());
        assert!(state.approve.is_none());
        assert_eq!(state.user_address(), Some("0xabc"));
    }

    #[test]
    fn from_config_takes_instant_fee() {
        let config = FoxyConfig {
            instant_fee_percentage: Decimal::from_str("0.003").unwrap(),
            ..FoxyConfig::default()
        };
        let state = WizardState::from_config(&config, Some("0xabc".into()));
        assert_eq!(state.foxy_fee_percentage, config.instant_fee_percentage);
        assert_eq!(state.current_step, WizardStep::Withdraw);
    }

    #[test]
    fn empty_address_counts_as_missing() {
        let state = WizardState::new(Some(String::new()), Decimal::ZERO);
        assert_eq!(state.user_address(), None);
        assert_eq!(WizardState::default().user_address(), None);
    }

    #[test]
    fn transitions() {
        assert!(WizardStep::Withdraw.can_transition_to(WizardStep::Approve));
        assert!(WizardStep::Withdraw.can_transition_to(WizardStep::Confirm));
        assert!(WizardStep::Approve.can_transition_to(WizardStep::Confirm));
        assert!(WizardStep::Confirm.can_transition_to(WizardStep::Status));
        assert!(!WizardStep::Withdraw.can_transition_to(WizardStep::Status));
        assert!(!WizardStep::Confirm.can_transition_to(WizardStep::Approve));
        assert!(!WizardStep::Status.can_transition_to(WizardStep::Withdraw));
    }

    #[test]
    fn advance_refuses_invalid_transition() {
        let mut state = WizardState::default();
        assert!(!state.advance(WizardStep::Status));
        assert_eq!(state.current_step, WizardStep::Withdraw);

        assert!(state.advance(WizardStep::Approve));
        assert!(state.advance(WizardStep::Confirm));
        assert!(!state.advance(WizardStep::Approve));
        assert!(state.advance(WizardStep::Status));
        assert!(state.is_complete());
    }

    #[test]
    fn set_payload_routes_by_kind() {
        let mut state = WizardState::default();
        state.set_payload(WizardPayload::Withdraw(withdraw_payload()));
        state.set_payload(WizardPayload::Approve(ApprovePayload {
            estimated_gas_crypto: "1".into(),
        }));
        assert_eq!(state.withdraw, Some(withdraw_payload()));
        assert_eq!(state.approve.as_ref().unwrap().estimated_gas_crypto, "1");
    }

    #[test]
    fn go_back_keeps_data_and_respects_loading() {
        let mut state = WizardState::default();
        state.set_payload(WizardPayload::Withdraw(withdraw_payload()));
        state.advance(WizardStep::Confirm);

        state.set_loading(true);
        assert!(!state.go_back());
        state.set_loading(false);

        assert!(state.go_back());
        assert_eq!(state.current_step, WizardStep::Withdraw);
        assert!(state.withdraw.is_some());
        assert!(!state.go_back());
    }

    #[test]
    fn reset_keeps_account_and_fee() {
        let fee = Decimal::from_str("0.003").unwrap();
        let mut state = WizardState::new(Some("0xabc".into()), fee);
        state.set_payload(WizardPayload::Withdraw(withdraw_payload()));
        state.advance(WizardStep::Confirm);

        state.reset();
        assert_eq!(state, WizardState::new(Some("0xabc".into()), fee));
    }

    #[test]
    fn step_indices_and_labels() {
        assert_eq!(WizardStep::Withdraw.index(), 0);
        assert_eq!(WizardStep::Status.index(), 3);
        assert_eq!(WizardStep::Approve.label(), "Approve");
    }
}
