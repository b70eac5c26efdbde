use crate::{error::DeployError, models::NetworkProfile};
use anyhow::{Context, Result};

pub const DEFAULT_NETWORK: &str = "polygonAmoyTestnet";

struct KnownNetwork {
    name: &'static str,
    aliases: &'static [&'static str],
    chain_id: u64,
    rpc_url: &'static str,
    rpc_env: &'static str,
    chain_id_env: Option<&'static str>,
}

const KNOWN_NETWORKS: &[KnownNetwork] = &[
    KnownNetwork {
        name: "polygonAmoyTestnet",
        aliases: &["polygonAmoy", "amoy"],
        chain_id: 80002,
        rpc_url: "https://polygon-amoy-bor.publicnode.com",
        rpc_env: "AMOY_RPC_HTTP",
        chain_id_env: Some("AMOY_CHAIN_ID"),
    },
    KnownNetwork {
        name: "polygonMainnet",
        aliases: &["polygon", "matic"],
        chain_id: 137,
        rpc_url: "https://polygon-rpc.com",
        rpc_env: "POLYGON_RPC_HTTP",
        chain_id_env: Some("POLYGON_CHAIN_ID"),
    },
    KnownNetwork {
        name: "megaTestnet",
        aliases: &["mega"],
        chain_id: 6342,
        rpc_url: "https://carrot.megaeth.com/rpc",
        rpc_env: "MEGA_RPC_HTTP",
        chain_id_env: Some("MEGA_CHAIN_ID"),
    },
    KnownNetwork {
        name: "hardhat",
        aliases: &["localhost", "local"],
        chain_id: 31337,
        rpc_url: "http://127.0.0.1:8545",
        rpc_env: "HARDHAT_RPC_HTTP",
        chain_id_env: None,
    },
];

/// Block explorer base URL for a chain.
pub fn explorer_for_chain(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        80002 => Some("https://amoy.polygonscan.com"),
        137 => Some("https://polygonscan.com"),
        6342 => Some("https://megaexplorer.io"),
        _ => None,
    }
}

pub fn explorer_address_url(explorer: &str, address: &str) -> String {
    format!("{}/address/{}", explorer.trim_end_matches('/'), address)
}

pub fn explorer_tx_url(explorer: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer.trim_end_matches('/'), tx_hash)
}

/// Networks selectable with `--network`, with RPC endpoints and chain ids
/// overridable from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<NetworkProfile>,
}

impl NetworkRegistry {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut networks = Vec::with_capacity(KNOWN_NETWORKS.len());
        for known in KNOWN_NETWORKS {
            let chain_id = match known.chain_id_env.and_then(&lookup) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {}", known.chain_id_env.unwrap_or_default()))?,
                None => known.chain_id,
            };
            let rpc_url = lookup(known.rpc_env).unwrap_or_else(|| known.rpc_url.to_string());

            networks.push(NetworkProfile {
                name: known.name,
                aliases: known.aliases,
                chain_id,
                rpc_url,
                explorer_url: explorer_for_chain(chain_id),
            });
        }
        Ok(Self { networks })
    }

    /// Resolves a network by name or alias; `None` selects the default network.
    pub fn resolve(&self, name: Option<&str>) -> Result<&NetworkProfile, DeployError> {
        let name = name.unwrap_or(DEFAULT_NETWORK);
        self.networks
            .iter()
            .find(|network| network.matches(name))
            .ok_or_else(|| {
                DeployError::config(format!(
                    "unknown network {name:?}, expected one of: {}",
                    self.names().join(", ")
                ))
            })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.networks.iter().map(|network| network.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.networks.iter()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::from_lookup(|_| None).unwrap_or_else(|_| Self { networks: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_network_is_amoy() {
        let registry = NetworkRegistry::default();
        let network = registry.resolve(None).unwrap();
        assert_eq!(network.name, "polygonAmoyTestnet");
        assert_eq!(network.chain_id, 80002);
        assert_eq!(network.explorer_url, Some("https://amoy.polygonscan.com"));
    }

    #[test]
    fn resolves_aliases() {
        let registry = NetworkRegistry::default();
        assert_eq!(registry.resolve(Some("polygonAmoy")).unwrap().chain_id, 80002);
        assert_eq!(registry.resolve(Some("POLYGON")).unwrap().chain_id, 137);
        assert_eq!(registry.resolve(Some("mega")).unwrap().chain_id, 6342);
        assert_eq!(registry.resolve(Some("localhost")).unwrap().explorer_url, None);
    }

    #[test]
    fn unknown_network_lists_choices() {
        let registry = NetworkRegistry::default();
        let err = registry.resolve(Some("sepolia")).unwrap_err();
        assert!(matches!(err, DeployError::ConfigError(ref msg) if msg.contains("polygonMainnet")));
    }

    #[test]
    fn environment_overrides_rpc_and_chain_id() {
        let vars = env(&[
            ("AMOY_RPC_HTTP", "https://rpc.example/amoy"),
            ("POLYGON_CHAIN_ID", "80002"),
        ]);
        let registry = NetworkRegistry::from_lookup(|k| vars.get(k).cloned()).unwrap();

        let amoy = registry.resolve(Some("amoy")).unwrap();
        assert_eq!(amoy.rpc_url, "https://rpc.example/amoy");

        let polygon = registry.resolve(Some("polygonMainnet")).unwrap();
        assert_eq!(polygon.chain_id, 80002);
        assert_eq!(polygon.explorer_url, explorer_for_chain(80002));
    }

    #[test]
    fn invalid_chain_id_is_rejected() {
        let vars = env(&[("AMOY_CHAIN_ID", "amoy")]);
        assert!(NetworkRegistry::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn explorer_links() {
        assert_eq!(explorer_for_chain(999999), None);
        assert_eq!(
            explorer_address_url("https://polygonscan.com/", "0xabc"),
            "https://polygonscan.com/address/0xabc"
        );
        assert_eq!(
            explorer_tx_url("https://polygonscan.com", "0x01"),
            "https://polygonscan.com/tx/0x01"
        );
    }
}
