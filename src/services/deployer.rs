use crate::{
    contracts::ContractArtifact,
    error::DeployError,
    models::FeeOverrides,
    services::EthereumService,
};
use ethers::{
    prelude::*,
    types::transaction::eip2718::TypedTransaction,
};
use std::{sync::Arc, time::Duration};

pub const DEFAULT_DEPLOY_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub admin: Address,
    pub gas_limit: Option<U256>,
    pub overrides: FeeOverrides,
    pub confirmations: usize,
    /// Upper limit for sending the transaction and waiting for confirmations.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub address: Address,
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub deployer: Address,
}

/// Applies gas limit and fee overrides to a deployment transaction.
///
/// Legacy transactions have a single gas price, which takes the max fee.
pub fn apply_overrides(tx: &mut TypedTransaction, gas_limit: Option<U256>, overrides: &FeeOverrides) {
    if let Some(gas) = gas_limit {
        tx.set_gas(gas);
    }
    if let TypedTransaction::Eip1559(inner) = tx {
        if let Some(max_fee) = overrides.max_fee_per_gas {
            inner.max_fee_per_gas = Some(max_fee);
        }
        if let Some(priority) = overrides.max_priority_fee_per_gas {
            inner.max_priority_fee_per_gas = Some(priority);
        }
    } else if let Some(max_fee) = overrides.max_fee_per_gas {
        tx.set_gas_price(max_fee);
    }
}

/// Signs and sends the deployment, then waits for `request.confirmations`.
pub async fn deploy(
    service: &EthereumService,
    wallet: LocalWallet,
    artifact: &ContractArtifact,
    request: &DeployRequest,
) -> Result<DeploymentOutcome, DeployError> {
    let client = Arc::new(SignerMiddleware::new(service.provider().clone(), wallet));
    let deployer = client.address();

    let mut tx = artifact.deploy_transaction(client.clone(), request.admin)?;
    tx.set_from(deployer);
    apply_overrides(&mut tx, request.gas_limit, &request.overrides);

    let send_and_wait = async {
        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| DeployError::DeploymentFailed(e.to_string()))?;
        let tx_hash = *pending;
        tracing::info!(?tx_hash, "Deployment transaction sent, waiting for confirmations");

        let receipt = pending
            .confirmations(request.confirmations.max(1))
            .await?
            .ok_or_else(|| DeployError::DeploymentFailed(format!("transaction {tx_hash:?} was dropped")))?;
        Ok::<_, DeployError>(receipt)
    };

    let receipt = tokio::time::timeout(request.timeout, send_and_wait)
        .await
        .map_err(|_| DeployError::Timeout {
            method: "deploy",
            secs: request.timeout.as_secs(),
        })??;

    if receipt.status != Some(1.into()) {
        return Err(DeployError::DeploymentFailed(format!(
            "transaction {:?} reverted",
            receipt.transaction_hash
        )));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        DeployError::DeploymentFailed(format!(
            "receipt for {:?} has no contract address",
            receipt.transaction_hash
        ))
    })?;

    tracing::info!(?address, tx_hash = ?receipt.transaction_hash, "Contract deployed");

    Ok(DeploymentOutcome {
        address,
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()),
        deployer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(9)
    }

    #[test]
    fn eip1559_overrides() {
        let mut tx: TypedTransaction = Eip1559TransactionRequest::new().into();
        let overrides = FeeOverrides {
            max_fee_per_gas: Some(gwei(50)),
            max_priority_fee_per_gas: Some(gwei(2)),
        };

        apply_overrides(&mut tx, Some(U256::from(300_000)), &overrides);

        assert_eq!(tx.gas(), Some(&U256::from(300_000)));
        match tx {
            TypedTransaction::Eip1559(inner) => {
                assert_eq!(inner.max_fee_per_gas, Some(gwei(50)));
                assert_eq!(inner.max_priority_fee_per_gas, Some(gwei(2)));
            }
            other => panic!("unexpected transaction type: {other:?}"),
        }
    }

    #[test]
    fn legacy_uses_max_fee_as_gas_price() {
        let mut tx: TypedTransaction = TransactionRequest::new().into();
        let overrides = FeeOverrides {
            max_fee_per_gas: Some(gwei(40)),
            max_priority_fee_per_gas: Some(gwei(2)),
        };

        apply_overrides(&mut tx, None, &overrides);

        assert_eq!(tx.gas(), None);
        assert_eq!(tx.gas_price(), Some(gwei(40)));
    }

    #[test]
    fn no_overrides_leave_transaction_untouched() {
        let original: TypedTransaction = Eip1559TransactionRequest::new().into();
        let mut tx = original.clone();
        apply_overrides(&mut tx, None, &FeeOverrides::default());
        assert_eq!(tx, original);
    }
}
