use crate::error::DeployError;
use crate::format::{group_thousands, native_display_units};
use crate::models::{FeeOverrides, FeeQuote, NativeMeta};
use ethers::types::U256;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_USD_TO_IDR: f64 = 17000.0;

/// Lower/upper pair that collapses to a single value when both ends agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounds<T> {
    Exact(T),
    Range { lower: T, upper: T },
}

impl<T: PartialEq> Bounds<T> {
    pub fn new(lower: T, upper: T) -> Self {
        if lower == upper {
            Bounds::Exact(upper)
        } else {
            Bounds::Range { lower, upper }
        }
    }
}

impl<T> Bounds<T> {
    pub fn lower(&self) -> &T {
        match self {
            Bounds::Exact(value) => value,
            Bounds::Range { lower, .. } => lower,
        }
    }

    pub fn upper(&self) -> &T {
        match self {
            Bounds::Exact(value) => value,
            Bounds::Range { upper, .. } => upper,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Bounds::Exact(_))
    }

    /// Maps both ends, preserving whether the bounds are exact.
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Bounds<U> {
        match self {
            Bounds::Exact(value) => Bounds::Exact(f(value)),
            Bounds::Range { lower, upper } => Bounds::Range {
                lower: f(lower),
                upper: f(upper),
            },
        }
    }

    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, mut f: F) -> Result<Bounds<U>, E> {
        Ok(match self {
            Bounds::Exact(value) => Bounds::Exact(f(value)?),
            Bounds::Range { lower, upper } => Bounds::Range {
                lower: f(lower)?,
                upper: f(upper)?,
            },
        })
    }
}

/// A cost in the reference (USD) and secondary (IDR) currency.
///
/// Nothing is rounded here; `idr_display` rounds at print time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiatAmount {
    pub usd: f64,
    pub idr: f64,
}

impl FiatAmount {
    pub fn from_wei(wei: U256, rates: &FiatRates) -> Result<Self, DeployError> {
        let usd = native_display_units(wei)? * rates.usd_per_native;
        Ok(Self {
            usd,
            idr: usd * rates.usd_to_idr,
        })
    }

    pub fn usd_display(&self) -> String {
        format!("${:.2}", self.usd)
    }

    pub fn idr_display(&self) -> String {
        format!("Rp {}", group_thousands(self.idr.round() as i64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiatRates {
    pub usd_per_native: f64,
    pub usd_to_idr: f64,
}

/// Fiat prices keyed by their environment variable (`MATIC_USD_PRICE`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct FiatSettings {
    pub prices: BTreeMap<String, f64>,
    pub usd_to_idr: f64,
}

impl Default for FiatSettings {
    fn default() -> Self {
        Self {
            prices: BTreeMap::new(),
            usd_to_idr: DEFAULT_USD_TO_IDR,
        }
    }
}

impl FiatSettings {
    /// Rates for a chain, or `None` when no positive price is configured.
    pub fn rates_for(&self, native: &NativeMeta) -> Option<FiatRates> {
        self.prices
            .get(native.price_env)
            .copied()
            .filter(|price| *price > 0.0)
            .map(|usd_per_native| FiatRates {
                usd_per_native,
                usd_to_idr: self.usd_to_idr,
            })
    }
}

/// Deployment cost estimate for one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub chain_id: u64,
    pub native: NativeMeta,
    pub gas_units: U256,
    pub quote: FeeQuote,
    pub overrides: FeeOverrides,
    pub max_fee_per_gas: U256,
    pub priority_fee_per_gas: U256,
    pub cost_wei: Bounds<U256>,
    /// `cost_wei` in native display units (`0.015`).
    pub cost_native: Bounds<String>,
    pub fiat: Option<Bounds<FiatAmount>>,
}

impl CostEstimate {
    pub fn upper_native(&self) -> &str {
        self.cost_native.upper()
    }

    pub fn lower_native(&self) -> &str {
        self.cost_native.lower()
    }

    pub fn summary(&self) -> EstimateSummary {
        let decimal = |value: U256| value.to_string();
        EstimateSummary {
            chain_id: self.chain_id,
            native_symbol: self.native.symbol,
            gas_units: decimal(self.gas_units),
            base_fee_per_gas: self.quote.base_fee_per_gas.map(decimal),
            max_fee_per_gas: decimal(self.max_fee_per_gas),
            priority_fee_per_gas: decimal(self.priority_fee_per_gas),
            cost_wei: self.cost_wei.map(decimal),
            cost_native: self.cost_native.clone(),
            upper_native: self.upper_native().to_string(),
            lower_native: self.lower_native().to_string(),
            fiat: self.fiat,
        }
    }
}

/// Machine-readable form of a [`CostEstimate`]. Wei amounts are decimal
/// strings so no precision is lost in JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub chain_id: u64,
    pub native_symbol: &'static str,
    pub gas_units: String,
    pub base_fee_per_gas: Option<String>,
    pub max_fee_per_gas: String,
    pub priority_fee_per_gas: String,
    pub cost_wei: Bounds<String>,
    pub cost_native: Bounds<String>,
    pub upper_native: String,
    pub lower_native: String,
    pub fiat: Option<Bounds<FiatAmount>>,
}
