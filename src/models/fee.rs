use crate::error::DeployError;
use ethers::{types::U256, utils::parse_units};

/// Wei per gwei.
pub const GWEI: u64 = 1_000_000_000;

/// Fee information reported by a node for the latest block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeQuote {
    /// Only present on fee-market (EIP-1559) chains.
    pub base_fee_per_gas: Option<U256>,
    pub suggested_priority_fee: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub legacy_gas_price: Option<U256>,
}

/// Caller supplied fee ceilings, already converted to wei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeOverrides {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeOverrides {
    pub fn is_empty(&self) -> bool {
        self.max_fee_per_gas.is_none() && self.max_priority_fee_per_gas.is_none()
    }
}

/// Parses a decimal gwei amount (e.g. `"1.5"`) into wei without going through floats.
pub fn parse_gwei(value: &str) -> Result<U256, DeployError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(DeployError::config(format!(
            "fee must not be negative: {value}"
        )));
    }
    parse_units(value, "gwei")
        .map(U256::from)
        .map_err(|e| DeployError::config(format!("invalid gwei amount {value:?}: {e}")))
}
