use std::collections::HashMap;

use num_bigint::BigUint;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use crate::amount::from_base_units;

/// Read access to the user's portfolio. Unknown assets read as zero balance
/// and zero price, and have no precision.
pub trait PortfolioStore: Send + Sync {
    /// Crypto balance in raw base units.
    fn balance_of(&self, asset_id: &str) -> BigUint;

    /// Market price in the user's fiat currency.
    fn price_of(&self, asset_id: &str) -> Decimal;

    /// Number of decimals the raw integer representation implies, or `None`
    /// if the store does not know the asset.
    fn asset_precision(&self, asset_id: &str) -> Option<u32>;
}

/// Everything the withdraw form needs about one asset, read at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSnapshot {
    pub balance_raw: BigUint,
    pub precision: u32,
    pub price: Decimal,
}

impl AssetSnapshot {
    /// `None` if the store does not know the asset.
    pub fn read(store: &dyn PortfolioStore, asset_id: &str) -> Option<Self> {
        Some(Self {
            precision: store.asset_precision(asset_id)?,
            balance_raw: store.balance_of(asset_id),
            price: store.price_of(asset_id),
        })
    }

    /// Balance in token units.
    pub fn available_crypto(&self) -> Decimal {
        from_base_units(&self.balance_raw, self.precision)
    }
}

#[derive(Debug, Clone)]
struct AssetEntry {
    precision: u32,
    price: Decimal,
    balance: BigUint,
}

/// Thread-safe in-memory portfolio for hosts that push balances and prices
/// from their own sources.
#[derive(Debug, Default)]
pub struct InMemoryPortfolio {
    assets: RwLock<HashMap<String, AssetEntry>>,
}

impl InMemoryPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset, replacing any previous entry.
    pub fn insert_asset(&self, asset_id: impl Into<String>, precision: u32, price: Decimal, balance: BigUint) {
        let asset_id = asset_id.into();
        debug!(asset_id = %asset_id, precision, "asset registered");
        self.assets.write().insert(
            asset_id,
            AssetEntry {
                precision,
                price,
                balance,
            },
        );
    }

    /// Update the raw balance. Returns `false` for unknown assets.
    pub fn set_balance(&self, asset_id: &str, balance: BigUint) -> bool {
        match self.assets.write().get_mut(asset_id) {
            Some(entry) => {
                entry.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Update the market price. Returns `false` for unknown assets.
    pub fn set_price(&self, asset_id: &str, price: Decimal) -> bool {
        match self.assets.write().get_mut(asset_id) {
            Some(entry) => {
                entry.price = price;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

impl PortfolioStore for InMemoryPortfolio {
    fn balance_of(&self, asset_id: &str) -> BigUint {
        self.assets
            .read()
            .get(asset_id)
            .map(|a| a.balance.clone())
            .unwrap_or_default()
    }

    fn price_of(&self, asset_id: &str) -> Decimal {
        self.assets
            .read()
            .get(asset_id)
            .map(|a| a.price)
            .unwrap_or(Decimal::ZERO)
    }

    fn asset_precision(&self, asset_id: &str) -> Option<u32> {
        self.assets.read().get(asset_id).map(|a| a.precision)
    }
}
