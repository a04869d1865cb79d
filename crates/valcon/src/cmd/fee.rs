use alloy_primitives::U256;
use clap::Parser;
use prettytable::{row, Table};
use valcon_cli_runner::CliContext;

use consolidation::{
    chain::{connect_http, get_block_number},
    consts::QUEUE_EXCESS_INHIBITOR,
    queue_length, required_fee,
};

use crate::common::Networks;

#[derive(Debug, Parser)]
#[clap(about = "Show the current EIP-7251 consolidation fee.")]
pub struct FeeCommand {
    #[arg(
        long,
        env = "ETH_RPC_URL",
        value_name = "URL",
        help = "The execution layer RPC endpoint."
    )]
    rpc_url: String,

    #[arg(
        long,
        value_enum,
        default_value = "mainnet",
        value_name = "NETWORK",
        help = "The network to query."
    )]
    network: Networks,
}

impl FeeCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let Self { rpc_url, network } = self;

        let network = network.to_network();
        let provider = connect_http(&rpc_url)?;

        let block_number = get_block_number(&provider).await?;
        let queue = queue_length(&provider, network).await?;
        let fee = if queue == QUEUE_EXCESS_INHIBITOR {
            U256::ZERO
        } else {
            required_fee(queue)
        };

        let mut table = Table::new();
        table.add_row(row![Fcb -> "Network", network]);
        table.add_row(row![Fcb -> "Block", block_number]);
        table.add_row(row![Fcb -> "Queue excess", queue]);
        table.add_row(row![Fcb -> "Fee (wei)", fee]);
        table.printstd();

        Ok(())
    }
}
