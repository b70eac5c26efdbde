use crate::{
    error::DeployError,
    models::{FeeQuote, GWEI},
};
use async_trait::async_trait;
use ethers::{
    prelude::*,
    providers::{Http, Provider, RpcError},
    types::transaction::eip2718::TypedTransaction,
};
use std::{future::Future, time::Duration};

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only view of a chain used by the estimator, balance check and verifier.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, DeployError>;

    async fn fee_quote(&self) -> Result<FeeQuote, DeployError>;

    /// Simulates `tx` and returns the gas units it would consume.
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, DeployError>;

    async fn balance(&self, address: Address) -> Result<U256, DeployError>;

    async fn code(&self, address: Address) -> Result<Bytes, DeployError>;
}

pub struct EthereumService {
    provider: Provider<Http>,
    timeout: Duration,
}

impl EthereumService {
    pub fn connect(rpc_url: &str, timeout: Duration) -> Result<Self, DeployError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DeployError::config(format!("invalid RPC URL {rpc_url}: {e}")))?;
        tracing::debug!(rpc_url, timeout_secs = timeout.as_secs(), "RPC provider configured");
        Ok(Self { provider, timeout })
    }

    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one RPC call, turning an elapsed deadline into `DeployError::Timeout`.
    async fn call<T, F>(&self, method: &'static str, fut: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::error!(method, "RPC call timed out");
                Err(DeployError::Timeout {
                    method,
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Like `call`, but a JSON-RPC error response becomes `None` so optional
    /// quote fields can be missing on nodes that do not support the method.
    /// Transport failures still propagate.
    async fn optional_call<T, F>(&self, method: &'static str, fut: F) -> Result<Option<T>, DeployError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match self.call(method, fut).await {
            Ok(value) => Ok(Some(value)),
            Err(DeployError::RpcError(e)) if is_error_response(&e) => {
                tracing::debug!(method, error = %e, "Optional fee field unavailable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// True when the node answered with a JSON-RPC error object, as opposed to
/// the request failing in transport or decoding.
fn is_error_response(error: &ProviderError) -> bool {
    RpcError::as_error_response(error).is_some()
}

#[async_trait]
impl ChainClient for EthereumService {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        let chain_id = self.call("eth_chainId", self.provider.get_chainid()).await?;
        Ok(chain_id.as_u64())
    }

    async fn fee_quote(&self) -> Result<FeeQuote, DeployError> {
        let latest = self
            .call(
                "eth_getBlockByNumber",
                self.provider.get_block(BlockNumber::Latest),
            )
            .await?;
        let base_fee_per_gas = latest.and_then(|block| block.base_fee_per_gas);

        let legacy_gas_price = self
            .optional_call("eth_gasPrice", self.provider.get_gas_price())
            .await?;
        let suggested_priority_fee = self
            .optional_call(
                "eth_maxPriorityFeePerGas",
                self.provider.request::<_, U256>("eth_maxPriorityFeePerGas", ()),
            )
            .await?;

        // Fee-market chains: 2 * base fee + tip, tip defaulting to 1 gwei.
        let max_fee_per_gas = base_fee_per_gas.map(|base| {
            let tip = suggested_priority_fee.unwrap_or_else(|| U256::from(GWEI));
            base.saturating_mul(U256::from(2)).saturating_add(tip)
        });

        let quote = FeeQuote {
            base_fee_per_gas,
            suggested_priority_fee,
            max_fee_per_gas,
            legacy_gas_price,
        };
        tracing::debug!(?quote, "Fetched fee quote");
        Ok(quote)
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, DeployError> {
        self.call("eth_estimateGas", self.provider.estimate_gas(tx, None))
            .await
    }

    async fn balance(&self, address: Address) -> Result<U256, DeployError> {
        self.call("eth_getBalance", self.provider.get_balance(address, None))
            .await
    }

    async fn code(&self, address: Address) -> Result<Bytes, DeployError> {
        self.call("eth_getCode", self.provider.get_code(address, None))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        let err = EthereumService::connect("not a url", DEFAULT_RPC_TIMEOUT).err().unwrap();
        assert!(matches!(err, DeployError::ConfigError(_)));
    }

    #[test]
    fn only_json_rpc_error_responses_count_as_unsupported() {
        assert!(!is_error_response(&ProviderError::CustomError("connection reset".into())));
        assert!(!is_error_response(&ProviderError::UnsupportedRPC));
    }

    #[test]
    fn keeps_configured_timeout() {
        let service =
            EthereumService::connect("http://127.0.0.1:8545", Duration::from_secs(5)).unwrap();
        assert_eq!(service.timeout(), Duration::from_secs(5));
    }
}
