use clap::{Parser, Subcommand};

/// Deploy and inspect the X402Splitter contract across networks.
#[derive(Parser, Debug)]
#[command(name = "x402-deploy", version, about, long_about = None)]
pub struct Cli {
    /// Network name or alias (defaults to polygonAmoyTestnet)
    #[arg(long, short, global = true, env = "NETWORK")]
    pub network: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the signer's native token balance
    Balance {
        /// Address to check instead of the signer or admin
        #[arg(long)]
        address: Option<String>,
    },
    /// Estimate the cost of deploying X402Splitter without sending anything
    Estimate {
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deploy X402Splitter and record it in the deployments file
    Deploy,
    /// List the configured networks
    Networks,
}
