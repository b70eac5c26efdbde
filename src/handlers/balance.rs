use crate::{
    config::Config,
    error::DeployError,
    format::format_native,
    models::{NativeMeta, NetworkProfile},
    services::{ChainClient, EthereumService},
};
use ethers::{types::Address, utils::to_checksum};
use std::str::FromStr;

const RULE: &str = "==========================================";

/// Address to check: the explicit argument, then the signer, then the admin.
pub fn resolve_address(config: &Config, address: Option<&str>) -> Result<Address, DeployError> {
    match address {
        Some(raw) => Address::from_str(raw)
            .map_err(|e| DeployError::config(format!("invalid address {raw}: {e}"))),
        None => config.deployer_address().map_err(|_| {
            DeployError::config("set PRIVATE_KEY or ADMIN_WALLET, or pass --address")
        }),
    }
}

pub async fn run(config: &Config, network: &NetworkProfile, address: Option<&str>) -> Result<(), DeployError> {
    let address = resolve_address(config, address)?;
    let service = EthereumService::connect(&network.rpc_url, config.rpc_timeout)?;

    let chain_id = service.chain_id().await?;
    let balance = service.balance(address).await?;
    let native = NativeMeta::for_chain(chain_id);

    println!("{RULE}");
    println!("Network : {} (chainId: {})", network.name, chain_id);
    println!("Signer  : {}", to_checksum(&address, None));
    println!("Balance : {} {}", format_native(balance)?, native.symbol);
    println!("{RULE}");
    Ok(())
}
