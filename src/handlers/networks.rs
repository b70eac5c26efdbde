use crate::{config::Config, services::registry::DEFAULT_NETWORK};

pub fn run(config: &Config) {
    println!("networks: {:?}", config.networks.names());
    println!("defaultNetwork: {DEFAULT_NETWORK}");
    println!();
    for network in config.networks.iter() {
        let marker = if network.name == DEFAULT_NETWORK { " (default)" } else { "" };
        println!("{}{}", network.name, marker);
        println!("  aliases  : {}", network.aliases.join(", "));
        println!("  chain id : {}", network.chain_id);
        println!("  rpc      : {}", network.rpc_url);
        println!("  explorer : {}", network.explorer_url.unwrap_or("-"));
        println!("  native   : {}", network.native().symbol);
    }
}
