//! Chain directory: alias to chain id, and alias to upstream RPC.

#[cfg(test)]
use std::collections::HashMap;

use crate::error::{ForkError, Result};

/// Known chain aliases and their numeric chain ids.
const CHAIN_IDS: &[(&str, u64)] = &[
    ("ethereum", 1),
    ("sepolia", 11_155_111),
    ("goerli", 5),
    ("optimism", 10),
    ("optimismTestnet", 420),
    ("polygon", 137),
    ("polygonTestnet", 80_001),
    ("arbitrum", 42_161),
    ("arbitrumTestnet", 421_613),
    ("base", 8453),
    ("zora", 7_777_777),
    ("zoraGoerli", 999),
    ("baseTestnet", 84_531),
    ("moonbeam", 1284),
    ("moonbeamTestnet", 1287),
    ("avalanche", 43_114),
    ("avalancheTestnet", 43_113),
    ("fantom", 250),
    ("fantomTestnet", 4002),
    ("solanaDevnet", 69_420),
    ("solana", 1_399_811_149),
];

/// Where upstream RPC URLs come from.
#[derive(Debug, Clone)]
enum RpcSource {
    /// `<ALIAS_UPPERCASE>_RPC` in the process environment.
    Env,
    /// Fixed alias to URL map.
    #[cfg(test)]
    Fixed(HashMap<String, String>),
}

/// Lookup of chain ids and upstream RPC endpoints.
#[derive(Debug, Clone)]
pub struct ChainDirectory {
    rpcs: RpcSource,
}

impl ChainDirectory {
    /// Directory resolving RPC URLs from environment variables.
    pub const fn from_env() -> Self {
        Self {
            rpcs: RpcSource::Env,
        }
    }

    /// Directory resolving RPC URLs from a fixed map.
    #[cfg(test)]
    pub fn with_rpcs<I, K, V>(rpcs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rpcs: RpcSource::Fixed(
                rpcs.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Chain id for `alias`.
    pub fn id_of(&self, alias: &str) -> Result<u64> {
        CHAIN_IDS
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, id)| *id)
            .ok_or_else(|| ForkError::UnknownChain(alias.to_string()))
    }

    /// Upstream RPC URL for `alias`. Empty values count as missing.
    pub fn rpc_of(&self, alias: &str) -> Result<String> {
        let var = rpc_var(alias);
        let rpc = match &self.rpcs {
            RpcSource::Env => std::env::var(&var).ok(),
            #[cfg(test)]
            RpcSource::Fixed(map) => map.get(alias).cloned(),
        };

        rpc.filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ForkError::MissingRpc {
                chain: alias.to_string(),
                var,
            })
    }
}

/// Environment variable holding the upstream RPC for `alias`.
pub fn rpc_var(alias: &str) -> String {
    format!("{}_RPC", alias.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_of_known_chains() {
        let chains = ChainDirectory::from_env();
        assert_eq!(chains.id_of("ethereum").unwrap(), 1);
        assert_eq!(chains.id_of("optimismTestnet").unwrap(), 420);
        assert_eq!(chains.id_of("solana").unwrap(), 1_399_811_149);
    }

    #[test]
    fn test_id_of_unknown_chain() {
        let chains = ChainDirectory::from_env();
        let err = chains.id_of("dogechain").unwrap_err();
        assert!(matches!(err, ForkError::UnknownChain(ref c) if c == "dogechain"));
    }

    #[test]
    fn test_rpc_var_uppercases_alias() {
        assert_eq!(rpc_var("ethereum"), "ETHEREUM_RPC");
        assert_eq!(rpc_var("optimismTestnet"), "OPTIMISMTESTNET_RPC");
    }

    #[test]
    fn test_rpc_of_fixed_map() {
        let chains = ChainDirectory::with_rpcs([("base", "https://base.example")]);
        assert_eq!(chains.rpc_of("base").unwrap(), "https://base.example");
    }

    #[test]
    fn test_rpc_of_missing_names_variable() {
        let chains = ChainDirectory::with_rpcs([("base", "")]);
        match chains.rpc_of("base").unwrap_err() {
            ForkError::MissingRpc { chain, var } => {
                assert_eq!(chain, "base");
                assert_eq!(var, "BASE_RPC");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(chains.rpc_of("ethereum").is_err());
    }

    #[test]
    fn test_chain_table_is_unique() {
        let chains = ChainDirectory::from_env();
        for (alias, id) in CHAIN_IDS {
            assert_eq!(chains.id_of(alias).unwrap(), *id);
        }
        let ids: std::collections::HashSet<u64> = CHAIN_IDS.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids.len(), CHAIN_IDS.len());
    }
}
