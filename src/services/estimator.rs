//! Deployment cost estimation.
//!
//! [`estimate_cost`] is the pure calculation; [`estimate_deployment`] gathers
//! its inputs from a [`ChainClient`] without broadcasting anything.

use crate::{
    error::DeployError,
    format::format_native,
    models::{
        Bounds, CostEstimate, FeeOverrides, FeeQuote, FiatAmount, FiatSettings, NativeMeta, GWEI,
    },
    services::ChainClient,
};
use ethers::types::{transaction::eip2718::TypedTransaction, U256};

/// Per-gas fees an estimate is computed with, all in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFees {
    pub max_fee_per_gas: U256,
    pub priority_fee_per_gas: U256,
}

/// Picks the max fee (override, suggested, legacy price) and priority fee
/// (override, suggested, 1 gwei).
pub fn resolve_fees(quote: &FeeQuote, overrides: &FeeOverrides) -> Result<ResolvedFees, DeployError> {
    let max_fee_per_gas = overrides
        .max_fee_per_gas
        .or(quote.max_fee_per_gas)
        .or(quote.legacy_gas_price)
        .ok_or(DeployError::NoFeeDataAvailable)?;
    let priority_fee_per_gas = overrides
        .max_priority_fee_per_gas
        .or(quote.suggested_priority_fee)
        .unwrap_or_else(|| U256::from(GWEI));

    Ok(ResolvedFees {
        max_fee_per_gas,
        priority_fee_per_gas,
    })
}

/// Computes the cost bounds for deploying with `gas_units` on `chain_id`.
///
/// The upper bound pays the full max fee. The lower bound pays base fee plus
/// tip, which a fee-market transaction never pays beyond its max fee, so
/// `lower <= upper` always holds. Without a base fee the bounds are equal.
pub fn estimate_cost(
    chain_id: u64,
    gas_units: U256,
    quote: &FeeQuote,
    overrides: &FeeOverrides,
    fiat: &FiatSettings,
) -> Result<CostEstimate, DeployError> {
    let fees = resolve_fees(quote, overrides)?;

    let upper = gas_units
        .checked_mul(fees.max_fee_per_gas)
        .ok_or(DeployError::Overflow("upper bound"))?;

    let lower = match quote.base_fee_per_gas {
        Some(base_fee) => {
            let effective = base_fee
                .checked_add(fees.priority_fee_per_gas)
                .ok_or(DeployError::Overflow("effective gas price"))?;
            if effective > fees.max_fee_per_gas {
                tracing::warn!(
                    %effective,
                    max_fee = %fees.max_fee_per_gas,
                    "Base fee plus tip exceeds max fee, capping lower bound"
                );
            }
            gas_units
                .checked_mul(effective.min(fees.max_fee_per_gas))
                .ok_or(DeployError::Overflow("lower bound"))?
        }
        None => upper,
    };

    let native = NativeMeta::for_chain(chain_id);
    let cost_wei = Bounds::new(lower, upper);
    let cost_native = cost_wei.try_map(format_native)?;
    let fiat = fiat
        .rates_for(&native)
        .map(|rates| cost_wei.try_map(|wei| FiatAmount::from_wei(wei, &rates)))
        .transpose()?;

    Ok(CostEstimate {
        chain_id,
        native,
        gas_units,
        quote: quote.clone(),
        overrides: *overrides,
        max_fee_per_gas: fees.max_fee_per_gas,
        priority_fee_per_gas: fees.priority_fee_per_gas,
        cost_wei,
        cost_native,
        fiat,
    })
}

/// Inputs of one estimation request besides the chain itself.
#[derive(Debug, Clone, Default)]
pub struct EstimateRequest {
    pub gas_limit: Option<U256>,
    pub overrides: FeeOverrides,
    pub fiat: FiatSettings,
}

/// Estimates the cost of sending `tx`, which must already carry its `from`.
///
/// Fee data is checked before gas is simulated so a node without fee data
/// fails fast with `NoFeeDataAvailable`.
pub async fn estimate_deployment<C>(
    client: &C,
    tx: &TypedTransaction,
    request: &EstimateRequest,
) -> Result<CostEstimate, DeployError>
where
    C: ChainClient + ?Sized,
{
    let chain_id = client.chain_id().await?;
    let quote = client.fee_quote().await?;
    resolve_fees(&quote, &request.overrides)?;

    let gas_units = match request.gas_limit {
        Some(gas_limit) => gas_limit,
        None => match client.estimate_gas(tx).await {
            Ok(units) => units,
            Err(e @ DeployError::Timeout { .. }) => return Err(e),
            Err(e) => return Err(DeployError::EstimationUnavailable(e.to_string())),
        },
    };
    tracing::info!(chain_id, %gas_units, "Estimated deployment gas");

    estimate_cost(chain_id, gas_units, &quote, &request.overrides, &request.fiat)
}
