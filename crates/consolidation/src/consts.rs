use alloy_primitives::{Address, U256};

use std::str::FromStr;

use addresses::{hoodi, mainnet};

pub mod addresses {
    pub mod mainnet {
        pub const CHAIN_ID: u64 = 1;

        /// EIP-7251 consolidation request predeploy
        pub const CONSOLIDATION_CONTRACT: &str = "0x0000BBdDc7CE488642fb579F8B00f3a590007251";
    }

    pub mod hoodi {
        pub const CHAIN_ID: u64 = 560048;

        /// EIP-7251 consolidation request predeploy
        pub const CONSOLIDATION_CONTRACT: &str = "0x0000BBdDc7CE488642fb579F8B00f3a590007251";
    }
}

/// Gas attached to every consolidation request transaction.
pub const CONSOLIDATION_TX_GAS: u64 = 91_000;

/// Storage slot of the consolidation contract holding the queue excess.
pub const QUEUE_EXCESS_SLOT: U256 = U256::ZERO;

/// All-ones marker the contract stores while the queue excess is unset.
pub const QUEUE_EXCESS_INHIBITOR: U256 = U256::MAX;

pub fn get_consolidation_contract(chain_id: u64) -> eyre::Result<Address> {
    match chain_id {
        mainnet::CHAIN_ID => Ok(Address::from_str(mainnet::CONSOLIDATION_CONTRACT)?),
        hoodi::CHAIN_ID => Ok(Address::from_str(hoodi::CONSOLIDATION_CONTRACT)?),
        _ => Err(eyre::eyre!("Chain ID not supported")),
    }
}
