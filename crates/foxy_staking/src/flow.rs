//! Decision flow behind the withdraw step's submit button.
//!
//! Given a request, the flow reads the allowance, picks the Approve or the
//! Confirm path, estimates that path's fee, and moves the wizard on. Failures
//! become a notification; the wizard stays where it was.

use std::sync::Arc;

use foxy_core::config::{ErrorMessages, FoxyConfig};
use foxy_core::notifications::{AppNotification, NotificationStore};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::amount::{AmountError, from_base_units, to_base_units};
use crate::chain::{ChainApi, ChainError, GasEstimate};
use crate::portfolio::PortfolioStore;
use crate::types::{ContractPair, WithdrawRequest};
use crate::wizard::{ApprovePayload, WithdrawPayload, WizardController, WizardPayload, WizardStep};

const NOTIFICATION_TITLE: &str = "Withdraw";

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Failure of one decision attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawError {
    #[error("{operation} failed: {source}")]
    InsufficientReserve {
        operation: &'static str,
        source: ChainError,
    },

    #[error("{operation} failed: {source}")]
    Chain {
        operation: &'static str,
        source: ChainError,
    },

    #[error("amount conversion failed: {0}")]
    Amount(#[from] AmountError),

    #[error("asset {0} is not in the portfolio")]
    UnknownAsset(String),

    #[error("wizard cannot move to {}", .0.label())]
    InvalidTransition(WizardStep),
}

impl WithdrawError {
    fn chain(operation: &'static str, source: ChainError) -> Self {
        if source.is_insufficient_reserve() {
            Self::InsufficientReserve { operation, source }
        } else {
            Self::Chain { operation, source }
        }
    }

    /// Name of the chain call that failed, or the local stage for errors
    /// raised before or after the chain calls.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::InsufficientReserve { operation, .. } | Self::Chain { operation, .. } => {
                operation
            }
            Self::Amount(_) => "amount",
            Self::UnknownAsset(_) => "portfolio",
            Self::InvalidTransition(_) => "advance",
        }
    }

    /// Text shown to the user.
    pub fn user_message<'a>(&self, messages: &'a ErrorMessages) -> &'a str {
        match self {
            Self::InsufficientReserve { .. } => &messages.insufficient_reserve,
            Self::Chain { .. }
            | Self::Amount(_)
            | Self::UnknownAsset(_)
            | Self::InvalidTransition(_) => &messages.generic,
        }
    }
}

/// What a call to [`WithdrawalDecisionFlow::decide`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Preconditions unmet (no account or no chain provider); nothing changed.
    Skipped,
    /// The estimate succeeded and the wizard moved to this step.
    Advanced(WizardStep),
    /// The attempt failed; the user was notified and neither the step nor the
    /// payloads changed.
    Failed(WithdrawError),
}

/// Allowance normalized to token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceState {
    pub allowance: Decimal,
}

impl AllowanceState {
    /// Whether the allowance lets the staking contract pull `amount`.
    pub fn covers(&self, amount: Decimal) -> bool {
        self.allowance >= amount
    }
}

/// Payloads to commit once the estimate has succeeded.
enum Route {
    Confirm(WithdrawPayload),
    Approve(WithdrawPayload, ApprovePayload),
}

impl Route {
    fn step(&self) -> WizardStep {
        match self {
            Self::Confirm(_) => WizardStep::Confirm,
            Self::Approve(..) => WizardStep::Approve,
        }
    }
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// Orchestrates the chain provider, portfolio and wizard for one staking
/// asset.
pub struct WithdrawalDecisionFlow {
    chain: Option<Arc<dyn ChainApi>>,
    portfolio: Arc<dyn PortfolioStore>,
    contracts: ContractPair,
    asset_id: String,
    messages: ErrorMessages,
    notifications: Arc<Mutex<NotificationStore>>,
}

impl WithdrawalDecisionFlow {
    /// A flow with no chain provider yet; `decide` is a no-op until one is set.
    pub fn new(
        portfolio: Arc<dyn PortfolioStore>,
        contracts: ContractPair,
        asset_id: impl Into<String>,
    ) -> Self {
        Self {
            chain: None,
            portfolio,
            contracts,
            asset_id: asset_id.into(),
            messages: ErrorMessages::default(),
            notifications: Arc::new(Mutex::new(NotificationStore::new())),
        }
    }

    /// Contracts, asset, messages and notification bound taken from config.
    pub fn from_config(config: &FoxyConfig, portfolio: Arc<dyn PortfolioStore>) -> Self {
        Self {
            messages: config.messages.clone(),
            notifications: Arc::new(Mutex::new(NotificationStore::with_capacity(
                config.max_notifications,
            ))),
            ..Self::new(portfolio, ContractPair::from_config(config), &config.asset_id)
        }
    }

    pub fn with_chain(mut self, chain: Arc<dyn ChainApi>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Share a notification store with the host.
    pub fn with_notifications(mut self, notifications: Arc<Mutex<NotificationStore>>) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn set_chain(&mut self, chain: Option<Arc<dyn ChainApi>>) {
        self.chain = chain;
    }

    pub fn notifications(&self) -> Arc<Mutex<NotificationStore>> {
        Arc::clone(&self.notifications)
    }

    /// Decide whether the request needs an approval first, estimate the fee
    /// for that path and advance the wizard.
    ///
    /// The host must not call this again while `wizard.is_loading()`; the flow
    /// does not lock. Payloads are only written when the estimate succeeds and
    /// the wizard accepted the step change.
    pub async fn decide<W>(&self, request: &WithdrawRequest, wizard: &mut W) -> DecisionOutcome
    where
        W: WizardController + ?Sized,
    {
        let Some(chain) = self.chain.as_deref() else {
            debug!("no chain provider, skipping withdraw decision");
            return DecisionOutcome::Skipped;
        };
        let Some(owner) = wizard.user_address().map(str::to_owned) else {
            debug!("no account connected, skipping withdraw decision");
            return DecisionOutcome::Skipped;
        };

        wizard.set_loading(true);
        let outcome = self
            .route(chain, request, &owner)
            .await
            .and_then(|route| Self::commit(route, wizard));
        wizard.set_loading(false);
        match outcome {
            Ok(step) => DecisionOutcome::Advanced(step),
            Err(err) => {
                self.report(&err);
                DecisionOutcome::Failed(err)
            }
        }
    }

    /// Move the wizard, then store the payloads. A refused step change leaves
    /// both untouched.
    fn commit<W>(route: Route, wizard: &mut W) -> Result<WizardStep, WithdrawError>
    where
        W: WizardController + ?Sized,
    {
        let step = route.step();
        if !wizard.advance(step) {
            return Err(WithdrawError::InvalidTransition(step));
        }
        match route {
            Route::Confirm(withdraw) => {
                wizard.set_payload(WizardPayload::Withdraw(withdraw));
            }
            Route::Approve(withdraw, approve) => {
                wizard.set_payload(WizardPayload::Withdraw(withdraw));
                wizard.set_payload(WizardPayload::Approve(approve));
            }
        }
        Ok(step)
    }

    async fn route(
        &self,
        chain: &dyn ChainApi,
        request: &WithdrawRequest,
        owner: &str,
    ) -> Result<Route, WithdrawError> {
        let ContractPair { token, spender } = &self.contracts;
        let precision = self
            .portfolio
            .asset_precision(&self.asset_id)
            .ok_or_else(|| WithdrawError::UnknownAsset(self.asset_id.clone()))?;
        let price = self.portfolio.price_of(&self.asset_id);

        let raw_allowance = chain
            .allowance(token, spender, owner)
            .await
            .map_err(|e| WithdrawError::chain("allowance", e))?;
        let allowance = AllowanceState {
            allowance: from_base_units(&raw_allowance, precision),
        };

        let mut withdraw = WithdrawPayload {
            crypto_amount: request.crypto_amount,
            fiat_amount: request.crypto_amount.saturating_mul(price),
            withdraw_type: request.withdraw_type,
            estimated_gas_crypto: None,
        };

        if allowance.covers(request.crypto_amount) {
            let amount = to_base_units(request.crypto_amount, precision)?;
            let estimate = estimate(
                chain.estimate_withdraw_gas(token, spender, &amount, owner, request.withdraw_type),
                "estimate_withdraw_gas",
                chain,
            )
            .await?;
            let fee = estimate.fee_string();
            info!(
                amount = %request.crypto_amount,
                withdraw_type = %request.withdraw_type,
                gas_limit = estimate.gas_limit,
                fee = %fee,
                "allowance sufficient, routing to confirm"
            );
            withdraw.estimated_gas_crypto = Some(fee);
            Ok(Route::Confirm(withdraw))
        } else {
            let estimate = estimate(
                chain.estimate_approve_gas(token, spender, owner),
                "estimate_approve_gas",
                chain,
            )
            .await?;
            let fee = estimate.fee_string();
            info!(
                amount = %request.crypto_amount,
                allowance = %allowance.allowance,
                gas_limit = estimate.gas_limit,
                fee = %fee,
                "allowance insufficient, routing to approve"
            );
            Ok(Route::Approve(
                withdraw,
                ApprovePayload {
                    estimated_gas_crypto: fee,
                },
            ))
        }
    }

    fn report(&self, err: &WithdrawError) {
        error!(operation = err.operation(), error = %err, "withdraw decision failed");
        let message = err.user_message(&self.messages);
        self.notifications
            .lock()
            .push(AppNotification::error(message).with_title(NOTIFICATION_TITLE));
    }
}

/// Run a gas-limit query and the gas-price query concurrently. Either
/// failing fails the estimate.
async fn estimate<F>(
    gas_limit: F,
    operation: &'static str,
    chain: &dyn ChainApi,
) -> Result<GasEstimate, WithdrawError>
where
    F: std::future::Future<Output = Result<u64, ChainError>>,
{
    let (gas_limit, gas_price) = tokio::try_join!(
        async { gas_limit.await.map_err(|e| WithdrawError::chain(operation, e)) },
        async {
            chain
                .gas_price()
                .await
                .map_err(|e| WithdrawError::chain("gas_price", e))
        },
    )?;
    Ok(GasEstimate::new(gas_limit, gas_price))
}
