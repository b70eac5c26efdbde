use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Gas estimation unavailable: {0}")]
    EstimationUnavailable(String),

    #[error("No fee data available: provider returned neither maxFeePerGas nor gasPrice and MAX_FEE_GWEI is not set")]
    NoFeeDataAvailable,

    #[error("RPC error: {0}")]
    RpcError(#[from] ethers::providers::ProviderError),

    #[error("RPC call {method} timed out after {secs}s")]
    Timeout { method: &'static str, secs: u64 },

    #[error("Failed to write deployment document {}: {source}", path.display())]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Contract artifact error: {0}")]
    ArtifactError(String),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("Unit conversion failed: {0}")]
    UnitConversion(#[from] ethers::utils::ConversionError),
}

impl DeployError {
    pub fn config(msg: impl Into<String>) -> Self {
        DeployError::ConfigError(msg.into())
    }

    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        DeployError::PersistenceError {
            path: path.into(),
            source: source.into(),
        }
    }
}
