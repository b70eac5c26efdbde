use crate::{error::DeployError, services::ChainClient};
use ethers::types::{Address, Bytes};

/// Result of comparing on-chain runtime code with the compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeCheck {
    Matches,
    NoCode,
    Differs {
        deployed_len: usize,
        expected_len: usize,
        first_mismatch: Option<usize>,
    },
}

impl CodeCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, CodeCheck::Matches)
    }
}

pub fn compare_code(deployed: &[u8], expected: &[u8]) -> CodeCheck {
    if deployed.is_empty() {
        return CodeCheck::NoCode;
    }
    if deployed == expected {
        return CodeCheck::Matches;
    }
    let first_mismatch = deployed
        .iter()
        .zip(expected)
        .position(|(d, e)| d != e);
    CodeCheck::Differs {
        deployed_len: deployed.len(),
        expected_len: expected.len(),
        first_mismatch,
    }
}

/// Fetches the code at `address` and compares it with `expected`.
pub async fn check_runtime_code<C>(
    client: &C,
    address: Address,
    expected: &Bytes,
) -> Result<CodeCheck, DeployError>
where
    C: ChainClient + ?Sized,
{
    let deployed = client.code(address).await?;
    let check = compare_code(&deployed, expected);
    match &check {
        CodeCheck::Matches => tracing::info!(?address, "Runtime code matches artifact"),
        CodeCheck::NoCode => tracing::warn!(?address, "No code found at address"),
        CodeCheck::Differs { first_mismatch, .. } => {
            let head = &deployed[..deployed.len().min(32)];
            tracing::warn!(
                ?address,
                ?first_mismatch,
                deployed_head = %hex::encode(head),
                "Runtime code differs from artifact"
            );
        }
    }
    Ok(check)
}
