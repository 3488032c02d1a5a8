use rust_decimal::Decimal;

use crate::amount::{
    AmountError, fiat_to_crypto, instant_withdraw_fee, is_empty_balance, percent_of,
    validate_crypto, validate_fiat,
};
use crate::portfolio::{AssetSnapshot, PortfolioStore};
use crate::types::{WithdrawRequest, WithdrawType};

/// Fields of the withdraw form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    CryptoAmount,
    FiatAmount,
    WithdrawType,
}

/// A user edit to one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    CryptoAmount(Decimal),
    FiatAmount(Decimal),
    WithdrawType(WithdrawType),
}

impl FormInput {
    pub fn field(&self) -> FormField {
        match self {
            Self::CryptoAmount(_) => FormField::CryptoAmount,
            Self::FiatAmount(_) => FormField::FiatAmount,
            Self::WithdrawType(_) => FormField::WithdrawType,
        }
    }
}

/// Which amount the user is typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Crypto,
    Fiat,
}

/// Form state behind the withdraw step. Crypto and fiat amounts are kept in
/// sync; the one in the active input mode is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawForm {
    asset: AssetSnapshot,
    crypto_amount: Decimal,
    fiat_amount: Decimal,
    withdraw_type: WithdrawType,
    input_mode: InputMode,
    percent: Option<Decimal>,
}

impl WithdrawForm {
    pub fn new(asset: AssetSnapshot) -> Self {
        Self {
            asset,
            crypto_amount: Decimal::ZERO,
            fiat_amount: Decimal::ZERO,
            withdraw_type: WithdrawType::Delayed,
            input_mode: InputMode::Crypto,
            percent: None,
        }
    }

    /// `None` if the portfolio does not know the asset.
    pub fn from_portfolio(store: &dyn PortfolioStore, asset_id: &str) -> Option<Self> {
        AssetSnapshot::read(store, asset_id).map(Self::new)
    }

    pub fn crypto_amount(&self) -> Decimal {
        self.crypto_amount
    }

    pub fn fiat_amount(&self) -> Decimal {
        self.fiat_amount
    }

    pub fn withdraw_type(&self) -> WithdrawType {
        self.withdraw_type
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Percent button last used, cleared by manual entry.
    pub fn percent(&self) -> Option<Decimal> {
        self.percent
    }

    pub fn available_crypto(&self) -> Decimal {
        self.asset.available_crypto()
    }

    /// Apply a user edit. Returns `true` if the form changed; manual amounts
    /// are refused while the withdraw type implies the amount.
    pub fn apply(&mut self, input: FormInput) -> bool {
        match input {
            FormInput::CryptoAmount(value) => {
                if !self.withdraw_type.allows_manual_amount() {
                    return false;
                }
                self.crypto_amount = value;
                self.fiat_amount = value.saturating_mul(self.asset.price);
                self.percent = None;
                true
            }
            FormInput::FiatAmount(value) => {
                if !self.withdraw_type.allows_manual_amount() {
                    return false;
                }
                self.fiat_amount = value;
                self.crypto_amount = fiat_to_crypto(value, self.asset.price, self.asset.precision);
                self.percent = None;
                true
            }
            FormInput::WithdrawType(withdraw_type) => self.set_withdraw_type(withdraw_type),
        }
    }

    /// Fill both amounts with `percent` (0..=1) of the available balance.
    pub fn set_percent(&mut self, percent: Decimal) -> bool {
        if !self.withdraw_type.allows_manual_amount() {
            return false;
        }
        self.fill_percent(percent)
    }

    fn fill_percent(&mut self, percent: Decimal) -> bool {
        if percent < Decimal::ZERO || percent > Decimal::ONE {
            return false;
        }
        let (crypto, fiat) = percent_of(
            percent,
            self.available_crypto(),
            self.asset.price,
            self.asset.precision,
        );
        self.crypto_amount = crypto;
        self.fiat_amount = fiat;
        self.percent = Some(percent);
        true
    }

    fn set_withdraw_type(&mut self, withdraw_type: WithdrawType) -> bool {
        if withdraw_type == self.withdraw_type {
            return false;
        }
        self.withdraw_type = withdraw_type;
        match withdraw_type {
            WithdrawType::Instant => {
                self.fill_percent(Decimal::ONE);
            }
            // The full balance was implied by Instant, not picked by the user.
            WithdrawType::Delayed => self.percent = None,
        }
        true
    }

    pub fn toggle_input_mode(&mut self) {
        self.input_mode = match self.input_mode {
            InputMode::Crypto => InputMode::Fiat,
            InputMode::Fiat => InputMode::Crypto,
        };
    }

    /// Replace the balance and price, e.g. after a portfolio refresh. An
    /// instant withdraw follows the new balance.
    pub fn refresh(&mut self, asset: AssetSnapshot) {
        self.asset = asset;
        match self.percent {
            Some(percent) => {
                self.fill_percent(percent);
            }
            None => self.fiat_amount = self.crypto_amount.saturating_mul(self.asset.price),
        }
    }

    /// Validation hint for the field in the active input mode.
    pub fn validation_error(&self) -> Option<(FormField, AmountError)> {
        match self.input_mode {
            InputMode::Crypto => {
                validate_crypto(self.crypto_amount, &self.asset.balance_raw, self.asset.precision)
                    .map(|e| (FormField::CryptoAmount, e))
            }
            InputMode::Fiat => validate_fiat(
                self.fiat_amount,
                &self.asset.balance_raw,
                self.asset.precision,
                self.asset.price,
            )
            .map(|e| (FormField::FiatAmount, e)),
        }
    }

    /// Instant withdraw fee in crypto units; zero for delayed withdraws.
    pub fn instant_fee(&self, fee_percentage: Decimal) -> Decimal {
        match self.withdraw_type {
            WithdrawType::Instant => instant_withdraw_fee(self.crypto_amount, fee_percentage),
            WithdrawType::Delayed => Decimal::ZERO,
        }
    }

    /// Whether the host should enable the submit control. Refusing while
    /// `loading` keeps a second decision from starting while one is in flight.
    pub fn can_submit(&self, loading: bool) -> bool {
        !loading
            && !is_empty_balance(&self.asset.balance_raw)
            && self.crypto_amount > Decimal::ZERO
            && self.validation_error().is_none()
    }

    pub fn to_request(&self) -> Result<WithdrawRequest, AmountError> {
        WithdrawRequest::new(self.crypto_amount, self.withdraw_type)
    }
}
