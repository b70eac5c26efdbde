/// Native token symbol and the environment key holding its USD price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMeta {
    pub symbol: &'static str,
    pub price_env: &'static str,
}

impl NativeMeta {
    pub const ETH: NativeMeta = NativeMeta {
        symbol: "ETH",
        price_env: "ETH_USD_PRICE",
    };
    pub const MATIC: NativeMeta = NativeMeta {
        symbol: "MATIC",
        price_env: "MATIC_USD_PRICE",
    };
    pub const MEGA: NativeMeta = NativeMeta {
        symbol: "MEGA",
        price_env: "MEGA_USD_PRICE",
    };

    /// Every price key any chain can resolve to.
    pub const PRICE_ENVS: [&'static str; 3] = [
        Self::ETH.price_env,
        Self::MATIC.price_env,
        Self::MEGA.price_env,
    ];

    /// Unknown chains fall back to ETH.
    pub fn for_chain(chain_id: u64) -> NativeMeta {
        match chain_id {
            80002 | 137 => Self::MATIC,
            6342 => Self::MEGA,
            _ => Self::ETH,
        }
    }
}

/// A network the tool can talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: Option<&'static str>,
}

impl NetworkProfile {
    pub fn native(&self) -> NativeMeta {
        NativeMeta::for_chain(self.chain_id)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}
