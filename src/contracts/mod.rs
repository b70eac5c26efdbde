pub mod x402_splitter;

pub use x402_splitter::{ContractArtifact, CONTRACT_NAME, DEFAULT_ARTIFACT_PATH};
