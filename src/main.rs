use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use x402_deployer::{
    cli::{Cli, Command},
    config::Config,
    handlers,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads NETWORK
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    tracing::debug!("x402-deploy v{}", env!("CARGO_PKG_VERSION"));

    let network = || {
        let network = config.networks.resolve(cli.network.as_deref())?;
        tracing::info!(network = network.name, chain_id = network.chain_id, "Using network");
        Ok::<_, x402_deployer::error::DeployError>(network)
    };

    match &cli.command {
        Command::Balance { address } => {
            handlers::balance::run(&config, network()?, address.as_deref()).await?
        }
        Command::Estimate { json } => handlers::estimate::run(&config, network()?, *json).await?,
        Command::Deploy => handlers::deploy::run(&config, network()?).await?,
        Command::Networks => handlers::networks::run(&config),
    }

    Ok(())
}
