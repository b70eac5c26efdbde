pub mod deployer;
pub mod estimator;
pub mod ethereum;
pub mod recorder;
pub mod registry;
pub mod verifier;

pub use deployer::{DeployRequest, DeploymentOutcome};
pub use estimator::{estimate_cost, estimate_deployment, EstimateRequest};
pub use ethereum::{ChainClient, EthereumService};
pub use recorder::DeploymentRecorder;
pub use registry::NetworkRegistry;
pub use verifier::CodeCheck;
