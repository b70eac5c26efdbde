use crate::{
    config::Config,
    contracts::{ContractArtifact, CONTRACT_NAME},
    error::DeployError,
    format::format_gwei,
    models::{CostEstimate, NetworkProfile},
    services::{estimate_deployment, EstimateRequest, EthereumService},
};
use ethers::types::{Address, U256};
use std::{fmt, sync::Arc};

const RULE: &str = "=====================================================";
const THIN_RULE: &str = "-----------------------------------------------------";

pub async fn run(config: &Config, network: &NetworkProfile, json: bool) -> Result<(), DeployError> {
    let admin = config.require_admin()?;
    let from = config.deployer_address()?;
    let artifact = ContractArtifact::load(&config.artifact_path)?;
    let service = EthereumService::connect(&network.rpc_url, config.rpc_timeout)?;

    let mut tx = artifact.deploy_transaction(Arc::new(service.provider().clone()), admin)?;
    tx.set_from(from);

    let request = EstimateRequest {
        gas_limit: config.gas_limit,
        overrides: config.fee_overrides,
        fiat: config.fiat.clone(),
    };
    let estimate = estimate_deployment(&service, &tx, &request).await?;

    if json {
        println!("{}", render_json(&estimate)?);
    } else {
        print!("{}", EstimateReport::new(network, admin, &estimate)?);
    }
    Ok(())
}

pub fn render_json(estimate: &CostEstimate) -> Result<String, DeployError> {
    serde_json::to_string_pretty(&estimate.summary())
        .map_err(|e| DeployError::config(format!("cannot render estimate: {e}")))
}

fn wei_and_gwei(wei: U256) -> Result<String, DeployError> {
    Ok(format!("{} ({} gwei)", wei, format_gwei(wei)?))
}

fn gwei_or_dash(fee: Option<U256>) -> Result<String, DeployError> {
    Ok(fee.map(format_gwei).transpose()?.unwrap_or_else(|| "-".to_string()))
}

/// Human-readable estimate. Equal bounds are printed once.
pub struct EstimateReport<'a> {
    network: &'a NetworkProfile,
    admin: Address,
    estimate: &'a CostEstimate,
    fee_lines: Vec<(&'static str, String)>,
}

impl<'a> EstimateReport<'a> {
    pub fn new(
        network: &'a NetworkProfile,
        admin: Address,
        estimate: &'a CostEstimate,
    ) -> Result<Self, DeployError> {
        let quote = &estimate.quote;
        let mut fee_lines = Vec::new();
        for (label, fee) in [
            ("baseFeePerGas (wei)", quote.base_fee_per_gas),
            ("suggested priority (wei)", quote.suggested_priority_fee),
            ("suggested maxFee (wei)", quote.max_fee_per_gas),
            ("legacy gasPrice (wei)", quote.legacy_gas_price),
        ] {
            if let Some(fee) = fee {
                fee_lines.push((label, wei_and_gwei(fee)?));
            }
        }
        let overrides = &estimate.overrides;
        if !overrides.is_empty() {
            fee_lines.push((
                "OVERRIDE maxFee/priority",
                format!(
                    "{} / {} gwei",
                    gwei_or_dash(overrides.max_fee_per_gas)?,
                    gwei_or_dash(overrides.max_priority_fee_per_gas)?
                ),
            ));
        }

        Ok(Self {
            network,
            admin,
            estimate,
            fee_lines,
        })
    }
}

impl fmt::Display for EstimateReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let estimate = self.estimate;
        let symbol = estimate.native.symbol;

        writeln!(f, "{RULE}")?;
        writeln!(f, "Estimating deploy cost for {CONTRACT_NAME}")?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "Network        : {}", self.network.name)?;
        writeln!(f, "Chain ID       : {}", estimate.chain_id)?;
        writeln!(f, "Admin (ctor)   : {:?}", self.admin)?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "{:<26}: {}", "Estimated gas units", estimate.gas_units)?;
        for (label, value) in &self.fee_lines {
            writeln!(f, "{label:<26}: {value}")?;
        }

        writeln!(f, "{THIN_RULE}")?;
        let (wei, native) = (&estimate.cost_wei, &estimate.cost_native);
        if wei.is_exact() {
            writeln!(f, "{:<26}: {} wei (~{} {symbol})", "Estimated cost", wei.upper(), native.upper())?;
        } else {
            writeln!(f, "{:<26}: {} wei (~{} {symbol})", "Upper bound cost", wei.upper(), native.upper())?;
            writeln!(f, "{:<26}: {} wei (~{} {symbol})", "Lower bound cost", wei.lower(), native.lower())?;
        }

        writeln!(f, "{THIN_RULE}")?;
        match &estimate.fiat {
            Some(fiat) if fiat.is_exact() => {
                let amount = fiat.upper();
                writeln!(f, "≈ {}  | {}", amount.usd_display(), amount.idr_display())?;
            }
            Some(fiat) => {
                let (lower, upper) = (fiat.lower(), fiat.upper());
                writeln!(f, "≈ Lower:  {}  | {}", lower.usd_display(), lower.idr_display())?;
                writeln!(f, "≈ Upper:  {}  | {}", upper.usd_display(), upper.idr_display())?;
            }
            None => {
                let key = estimate.native.price_env;
                writeln!(f, "(Tip) Set {key} for USD/IDR conversion, e.g. {key}=0.62")?;
            }
        }
        writeln!(f, "{RULE}")
    }
}
