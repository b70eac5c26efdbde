use crate::error::DeployError;
use ethers::{
    abi::Abi,
    prelude::*,
    types::transaction::eip2718::TypedTransaction,
};
use serde::Deserialize;
use std::{fs, path::Path, sync::Arc};

pub const CONTRACT_NAME: &str = "X402Splitter";

pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/contracts/X402Splitter.sol/X402Splitter.json";

/// Compiled contract as written by hardhat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    pub abi: Abi,
    pub bytecode: Bytes,
    #[serde(default)]
    pub deployed_bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            DeployError::ArtifactError(format!(
                "cannot read {} (compile the contracts first): {e}",
                path.display()
            ))
        })?;
        let artifact = Self::from_json(&raw)
            .map_err(|e| DeployError::ArtifactError(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            contract = artifact.name(),
            bytecode_len = artifact.bytecode.len(),
            "Loaded contract artifact"
        );
        Ok(artifact)
    }

    pub fn from_json(raw: &str) -> Result<Self, DeployError> {
        let artifact: Self = serde_json::from_str(raw)
            .map_err(|e| DeployError::ArtifactError(format!("malformed artifact: {e}")))?;
        if artifact.bytecode.is_empty() {
            return Err(DeployError::ArtifactError(format!(
                "{} has no creation bytecode",
                artifact.name()
            )));
        }
        Ok(artifact)
    }

    pub fn name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or(CONTRACT_NAME)
    }

    /// Builds the unsigned deployment transaction with `admin` as the only
    /// constructor argument. Nothing is sent.
    pub fn deploy_transaction<M: Middleware>(
        &self,
        client: Arc<M>,
        admin: Address,
    ) -> Result<TypedTransaction, DeployError> {
        let factory = ContractFactory::new(self.abi.clone(), self.bytecode.clone(), client);
        let deployer = factory
            .deploy(admin)
            .map_err(|e| DeployError::ArtifactError(format!("cannot encode constructor: {e}")))?;
        Ok(deployer.tx)
    }
}
