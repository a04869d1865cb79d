use clap::{Parser, ValueEnum};

use beaconchain::{BeaconChainClient, BeaconChainConfig, Network, RateLimits};

#[derive(ValueEnum, Clone, Debug)]
pub enum Networks {
    #[value(alias("mainnet"))]
    Mainnet,
    #[value(alias("hoodi"))]
    Hoodi,
}

impl Networks {
    pub fn as_str(&self) -> &str {
        match self {
            Networks::Mainnet => "mainnet",
            Networks::Hoodi => "hoodi",
        }
    }

    pub fn to_network(&self) -> Network {
        match self {
            Networks::Mainnet => Network::Mainnet,
            Networks::Hoodi => Network::Hoodi,
        }
    }

    pub fn get_by_chain_id(chain_id: u64) -> eyre::Result<String> {
        match chain_id {
            1 => Ok(Networks::Mainnet.as_str().to_string()),
            560048 => Ok(Networks::Hoodi.as_str().to_string()),
            _ => Err(eyre::eyre!("Chain ID not supported")),
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct BeaconApiCliArgs {
    #[arg(
        long,
        env = "BEACONCHAIN_API_KEY",
        value_name = "KEY",
        help = "API key for the validator data API. Falls back to anonymous access."
    )]
    pub api_key: Option<String>,

    #[arg(
        long,
        default_value = "2",
        value_name = "N",
        help = "Maximum validator data API requests per second."
    )]
    pub rate_limit_per_second: u32,

    #[arg(
        long,
        default_value = "100",
        value_name = "N",
        help = "Maximum validator data API requests per minute."
    )]
    pub rate_limit_per_minute: usize,
}

impl BeaconApiCliArgs {
    pub fn client(&self, network: Network) -> BeaconChainClient {
        BeaconChainClient::new(
            network,
            BeaconChainConfig {
                api_key: self.api_key.clone(),
                rate_limits: RateLimits {
                    per_second: self.rate_limit_per_second,
                    per_minute: self.rate_limit_per_minute,
                },
                retry: Default::default(),
            },
        )
    }
}
