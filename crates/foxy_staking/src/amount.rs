//! Amount math: base-unit conversion, balance validation and
//! percent-of-balance helpers.
//!
//! All arithmetic is done in [`Decimal`] or [`BigUint`]; amounts derived from
//! a balance are truncated toward zero so a suggested amount never exceeds
//! what the user holds.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest scale a [`Decimal`] can carry.
const MAX_SCALE: u32 = 28;

/// Validation hint for a user-entered amount. Returned as a value, never
/// propagated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("amount must not be negative")]
    Negative,

    #[error("invalid amount: {0}")]
    Invalid(String),
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// Convert a raw integer amount (e.g. wei) to token units.
///
/// Exact when the result fits a `Decimal` mantissa. Otherwise trailing
/// fraction digits are dropped, and values whose integer part alone is too
/// large (unlimited approvals) saturate to [`Decimal::MAX`].
pub fn from_base_units(raw: &BigUint, precision: u32) -> Decimal {
    let mut scale = precision.min(MAX_SCALE);
    let mut value = raw / pow10(precision - scale);
    loop {
        if let Some(mantissa) = value.to_i128() {
            if let Ok(d) = Decimal::try_from_i128_with_scale(mantissa, scale) {
                return d.normalize();
            }
        }
        if scale == 0 {
            return Decimal::MAX;
        }
        value /= 10u32;
        scale -= 1;
    }
}

/// Scale a token amount to raw integer units, rounded half away from zero to
/// 0 decimal places.
pub fn to_base_units(amount: Decimal, precision: u32) -> Result<BigUint, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }
    let mantissa = BigUint::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();

    if precision >= scale {
        return Ok(mantissa * pow10(precision - scale));
    }

    let divisor = pow10(scale - precision);
    let quotient = &mantissa / &divisor;
    let remainder = &mantissa % &divisor;
    if remainder * 2u32 >= divisor {
        Ok(quotient + 1u32)
    } else {
        Ok(quotient)
    }
}

/// Validate a crypto amount against a raw balance.
///
/// Zero is the empty draft state and is never an error.
pub fn validate_crypto(value: Decimal, balance_raw: &BigUint, precision: u32) -> Option<AmountError> {
    let balance = from_base_units(balance_raw, precision);
    check_against(value, balance)
}

/// Validate a fiat amount against the fiat value of a raw balance.
pub fn validate_fiat(
    value: Decimal,
    balance_raw: &BigUint,
    precision: u32,
    price: Decimal,
) -> Option<AmountError> {
    let ceiling = from_base_units(balance_raw, precision).saturating_mul(price);
    check_against(value, ceiling)
}

fn check_against(value: Decimal, ceiling: Decimal) -> Option<AmountError> {
    if value.is_zero() {
        return None;
    }
    if value.is_sign_negative() {
        return Some(AmountError::Negative);
    }
    if ceiling > Decimal::ZERO && ceiling >= value {
        None
    } else {
        Some(AmountError::InsufficientFunds)
    }
}

/// Crypto and fiat amounts for `percent` (0..=1) of the available balance.
/// The crypto amount is truncated to `precision` decimals.
pub fn percent_of(
    percent: Decimal,
    available_crypto: Decimal,
    price: Decimal,
    precision: u32,
) -> (Decimal, Decimal) {
    let crypto = available_crypto
        .saturating_mul(percent)
        .round_dp_with_strategy(precision, RoundingStrategy::ToZero);
    let fiat = crypto.saturating_mul(price);
    (crypto, fiat)
}

/// Crypto amount for a fiat input, truncated to `precision` decimals. Zero
/// when there is no usable price.
pub fn fiat_to_crypto(fiat: Decimal, price: Decimal, precision: u32) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    fiat.checked_div(price)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

/// Fee the staking contract keeps on an instant withdraw.
pub fn instant_withdraw_fee(crypto_amount: Decimal, fee_percentage: Decimal) -> Decimal {
    crypto_amount.saturating_mul(fee_percentage).normalize()
}

/// True when `raw` is zero.
pub(crate) fn is_empty_balance(raw: &BigUint) -> bool {
    raw.is_zero()
}
