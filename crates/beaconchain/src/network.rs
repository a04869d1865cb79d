use std::{fmt, str::FromStr};

use thiserror::Error;

/// Networks supported by the consolidation tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Hoodi,
}

#[derive(Debug, Error)]
#[error("invalid network: {0}. Supported networks: mainnet, hoodi")]
pub struct UnsupportedNetwork(String);

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Hoodi => "hoodi",
        }
    }

    pub const fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Hoodi => 560048,
        }
    }

    /// Base URL of the block-explorer style validator data API.
    pub fn api_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://beaconcha.in/api/v1",
            Network::Hoodi => "https://hoodi.beaconcha.in/api/v1",
        }
    }

    /// Beacon node spec endpoint used to resolve protocol constants.
    pub fn spec_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://ethereum-beacon-api.publicnode.com/eth/v1/config/spec",
            Network::Hoodi => "https://ethereum-hoodi-beacon-api.publicnode.com/eth/v1/config/spec",
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Result<Self, UnsupportedNetwork> {
        match chain_id {
            1 => Ok(Network::Mainnet),
            560048 => Ok(Network::Hoodi),
            other => Err(UnsupportedNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnsupportedNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "hoodi" => Ok(Network::Hoodi),
            other => Err(UnsupportedNetwork(other.to_string())),
        }
    }
}
