use crate::{
    contracts::DEFAULT_ARTIFACT_PATH,
    error::DeployError,
    models::{parse_gwei, FeeOverrides, FiatSettings, NativeMeta, DEFAULT_USD_TO_IDR},
    services::{
        deployer::DEFAULT_DEPLOY_TIMEOUT, ethereum::DEFAULT_RPC_TIMEOUT,
        recorder::DEFAULT_DEPLOYMENTS_FILE, NetworkRegistry,
    },
};
use anyhow::{bail, Context, Result};
use ethers::{
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};
use std::{path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    // Deployment
    pub admin: Option<Address>,
    pub private_key: Option<String>,
    pub confirmations: usize,
    pub auto_verify: bool,

    // Gas
    pub gas_limit: Option<U256>,
    pub fee_overrides: FeeOverrides,

    // Fiat conversion
    pub fiat: FiatSettings,

    // Files
    pub deployments_path: PathBuf,
    pub artifact_path: PathBuf,

    // RPC
    pub rpc_timeout: Duration,
    pub deploy_timeout: Duration,
    pub networks: NetworkRegistry,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before this runs.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let admin = match var("ADMIN_WALLET").or_else(|| var("X402_ADMIN_WALLET")) {
            Some(raw) => Some(
                Address::from_str(&raw).context("Invalid address for ADMIN_WALLET / X402_ADMIN_WALLET")?,
            ),
            None => None,
        };

        let mut prices = std::collections::BTreeMap::new();
        for key in NativeMeta::PRICE_ENVS {
            if let Some(raw) = var(key) {
                let price: f64 = raw.parse().with_context(|| format!("Invalid {}", key))?;
                prices.insert(key.to_string(), price);
            }
        }

        let config = Self {
            admin,
            private_key: var("PRIVATE_KEY"),
            confirmations: var("CONFIRMATIONS")
                .unwrap_or_else(|| "1".to_string())
                .parse()
                .context("Invalid CONFIRMATIONS")?,
            auto_verify: var("AUTO_VERIFY").as_deref() == Some("true"),

            gas_limit: var("GAS_LIMIT")
                .map(|raw| U256::from_dec_str(&raw))
                .transpose()
                .context("Invalid GAS_LIMIT")?,
            fee_overrides: FeeOverrides {
                max_fee_per_gas: var("MAX_FEE_GWEI")
                    .map(|raw| parse_gwei(&raw))
                    .transpose()
                    .context("Invalid MAX_FEE_GWEI")?,
                max_priority_fee_per_gas: var("MAX_PRIORITY_FEE_GWEI")
                    .map(|raw| parse_gwei(&raw))
                    .transpose()
                    .context("Invalid MAX_PRIORITY_FEE_GWEI")?,
            },

            fiat: FiatSettings {
                prices,
                usd_to_idr: var("DOLLAR_USD_TO_RUPIAH")
                    .map(|raw| raw.parse::<f64>())
                    .transpose()
                    .context("Invalid DOLLAR_USD_TO_RUPIAH")?
                    .unwrap_or(DEFAULT_USD_TO_IDR),
            },

            deployments_path: var("DEPLOYMENTS_FILE")
                .unwrap_or_else(|| DEFAULT_DEPLOYMENTS_FILE.to_string())
                .into(),
            artifact_path: var("X402_ARTIFACT")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_PATH.to_string())
                .into(),

            rpc_timeout: Self::parse_secs(var("RPC_TIMEOUT_SECS"), DEFAULT_RPC_TIMEOUT)
                .context("Invalid RPC_TIMEOUT_SECS")?,
            deploy_timeout: Self::parse_secs(var("DEPLOY_TIMEOUT_SECS"), DEFAULT_DEPLOY_TIMEOUT)
                .context("Invalid DEPLOY_TIMEOUT_SECS")?,
            networks: NetworkRegistry::from_lookup(var)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_secs(raw: Option<String>, default: Duration) -> Result<Duration> {
        match raw {
            Some(raw) => Ok(Duration::from_secs(raw.parse()?)),
            None => Ok(default),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.confirmations == 0 {
            bail!("CONFIRMATIONS must be at least 1");
        }
        if !(self.fiat.usd_to_idr.is_finite() && self.fiat.usd_to_idr > 0.0) {
            bail!("DOLLAR_USD_TO_RUPIAH must be a positive number");
        }
        if let Some((key, _)) = self
            .fiat
            .prices
            .iter()
            .find(|(_, price)| !(price.is_finite() && **price >= 0.0))
        {
            bail!("{} must be a non-negative number", key);
        }
        if self.rpc_timeout.is_zero() || self.deploy_timeout.is_zero() {
            bail!("RPC_TIMEOUT_SECS and DEPLOY_TIMEOUT_SECS must be positive");
        }
        if let Some(key) = &self.private_key {
            let hex_part = key.strip_prefix("0x").unwrap_or(key);
            if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!("PRIVATE_KEY must be 32 bytes of hex");
            }
        }

        tracing::debug!(
            admin = ?self.admin,
            has_private_key = self.private_key.is_some(),
            gas_limit = ?self.gas_limit,
            "Configuration validated"
        );

        Ok(())
    }

    pub fn require_admin(&self) -> Result<Address, DeployError> {
        self.admin
            .ok_or_else(|| DeployError::config("ADMIN_WALLET / X402_ADMIN_WALLET not set"))
    }

    pub fn wallet(&self) -> Result<Option<LocalWallet>, DeployError> {
        self.private_key
            .as_deref()
            .map(|key| {
                key.parse::<LocalWallet>()
                    .map_err(|e| DeployError::config(format!("invalid PRIVATE_KEY: {e}")))
            })
            .transpose()
    }

    pub fn require_wallet(&self) -> Result<LocalWallet, DeployError> {
        self.wallet()?
            .ok_or_else(|| DeployError::config("PRIVATE_KEY not set"))
    }

    /// Address that would send the deployment: the signer if a key is set,
    /// otherwise the admin.
    pub fn deployer_address(&self) -> Result<Address, DeployError> {
        match self.wallet()? {
            Some(wallet) => Ok(wallet.address()),
            None => self.require_admin(),
        }
    }
}
