use crate::{
    config::Config,
    contracts::{ContractArtifact, CONTRACT_NAME},
    error::DeployError,
    format::format_gwei,
    models::{DeploymentRecord, NetworkProfile},
    services::{
        deployer::{self, DeployRequest, DeploymentOutcome},
        registry::{explorer_address_url, explorer_for_chain, explorer_tx_url},
        verifier, ChainClient, DeploymentRecorder, EthereumService,
    },
};
use chrono::Utc;
use ethers::{signers::Signer, types::Address, utils::to_checksum};

const RULE: &str = "==============================================";

const IMPLEMENTATION_NOTE: &str =
    "Simple splitter for native/ERC20. Update this note if you upgrade contract.";

pub async fn run(config: &Config, network: &NetworkProfile) -> Result<(), DeployError> {
    let admin = config.require_admin()?;
    let wallet = config.require_wallet()?;
    let artifact = ContractArtifact::load(&config.artifact_path)?;
    let service = EthereumService::connect(&network.rpc_url, config.rpc_timeout)?;

    let chain_id = service.chain_id().await?;
    if chain_id != network.chain_id {
        tracing::warn!(
            expected = network.chain_id,
            actual = chain_id,
            network = network.name,
            "RPC endpoint reports a different chain id"
        );
    }
    let wallet = wallet.with_chain_id(chain_id);

    println!("{RULE}");
    println!("Deploying {}...", CONTRACT_NAME);
    println!("Network   : {} (chainId: {})", network.name, chain_id);
    println!("Admin     : {}", to_checksum(&admin, None));
    if let Some(gas) = config.gas_limit {
        println!("Gas limit : {}", gas);
    }
    if let Some(max_fee) = config.fee_overrides.max_fee_per_gas {
        println!("Max fee   : {} gwei", format_gwei(max_fee)?);
    }
    if let Some(priority) = config.fee_overrides.max_priority_fee_per_gas {
        println!("Priority  : {} gwei", format_gwei(priority)?);
    }
    println!("{RULE}");

    let request = DeployRequest {
        admin,
        gas_limit: config.gas_limit,
        overrides: config.fee_overrides,
        confirmations: config.confirmations,
        timeout: config.deploy_timeout,
    };
    let outcome = deployer::deploy(&service, wallet, &artifact, &request).await?;

    let explorer = explorer_for_chain(chain_id);
    println!("Deployed!");
    println!("Address  : {}", to_checksum(&outcome.address, None));
    println!(
        "Block    : {}",
        outcome
            .block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Deployer : {}", to_checksum(&outcome.deployer, None));
    if let Some(explorer) = explorer {
        println!(
            "Explorer : {}",
            explorer_address_url(explorer, &to_checksum(&outcome.address, None))
        );
        println!("Tx       : {}", explorer_tx_url(explorer, &format!("{:?}", outcome.tx_hash)));
    }

    let record = build_record(network.name, chain_id, admin, &outcome, explorer);
    let recorder = DeploymentRecorder::new(&config.deployments_path);
    recorder.upsert(chain_id, CONTRACT_NAME, record)?;
    println!("Written to: {}", recorder.path().display());

    if config.auto_verify {
        println!("Verifying runtime code...");
        match verifier::check_runtime_code(&service, outcome.address, &artifact.deployed_bytecode).await {
            Ok(check) if check.is_match() => println!("Verify success"),
            Ok(check) => tracing::warn!(?check, "Verification skipped/failed"),
            Err(e) => tracing::warn!(error = %e, "Verification skipped/failed"),
        }
    }

    Ok(())
}

pub fn build_record(
    network_name: &str,
    chain_id: u64,
    admin: Address,
    outcome: &DeploymentOutcome,
    explorer: Option<&str>,
) -> DeploymentRecord {
    DeploymentRecord {
        address: outcome.address,
        admin,
        network_name: network_name.to_string(),
        chain_id,
        deploy_tx: outcome.tx_hash,
        block_number: outcome.block_number,
        deployed_at: Utc::now(),
        explorer: explorer.map(str::to_string),
        constructor_args: vec![to_checksum(&admin, None)],
        implementation_note: Some(IMPLEMENTATION_NOTE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::H256;

    #[test]
    fn record_carries_outcome_and_admin() {
        let admin = Address::from_low_u64_be(0xad);
        let outcome = DeploymentOutcome {
            address: Address::from_low_u64_be(0x402),
            tx_hash: H256::from_low_u64_be(1),
            block_number: Some(42),
            deployer: Address::from_low_u64_be(0xde),
        };

        let record = build_record(
            "polygonAmoyTestnet",
            80002,
            admin,
            &outcome,
            explorer_for_chain(80002),
        );

        assert_eq!(record.address, outcome.address);
        assert_eq!(record.deploy_tx, outcome.tx_hash);
        assert_eq!(record.block_number, Some(42));
        assert_eq!(record.explorer.as_deref(), Some("https://amoy.polygonscan.com"));
        assert_eq!(record.constructor_args, vec![to_checksum(&admin, None)]);
        assert!(record.implementation_note.is_some());
    }
}
