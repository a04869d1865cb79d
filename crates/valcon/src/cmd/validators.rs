use alloy_primitives::U256;
use clap::Parser;
use colored::Colorize;
use prettytable::{row, Table};
use valcon_cli_runner::CliContext;

use std::collections::HashMap;

use beaconchain::{CredentialsQuery, ValidatorRecord};
use consolidation::is_consolidable;

use crate::{
    common::{BeaconApiCliArgs, Networks},
    utils::{format_number_with_decimals, print_loading_until_async},
};

#[derive(Debug, Parser)]
#[clap(about = "List validators for a withdrawal address or credentials, with their consolidation eligibility.")]
pub struct ValidatorsCommand {
    #[arg(
        value_name = "ADDRESS_OR_CREDENTIALS",
        help = "Execution address or 32 byte withdrawal credentials the validators withdraw to."
    )]
    query: CredentialsQuery,

    #[arg(
        long,
        value_enum,
        default_value = "mainnet",
        value_name = "NETWORK",
        help = "The network to query."
    )]
    network: Networks,

    #[clap(flatten)]
    beacon: BeaconApiCliArgs,
}

impl ValidatorsCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let Self {
            query,
            network,
            beacon,
        } = self;

        let network = network.to_network();
        let client = beacon.client(network);

        let shard_committee_period = client.shard_committee_period().await;
        let current_epoch =
            print_loading_until_async("Fetching current epoch", client.current_epoch()).await?;

        let validators = print_loading_until_async(
            "Fetching validators",
            client.validators_by_withdrawal_credentials(&query),
        )
        .await?;
        if validators.is_empty() {
            println!(
                "{}",
                "No validators found for the given withdrawal credentials.".bright_yellow()
            );
            return Ok(());
        }

        let indices: Vec<String> = validators
            .iter()
            .map(|validator| validator.index.to_string())
            .collect();
        let details = print_loading_until_async(
            "Fetching validator details",
            client.validators_by_indices_or_pubkeys(&indices),
        )
        .await?;
        let by_index: HashMap<u64, &ValidatorRecord> = details
            .iter()
            .map(|record| (record.index, record))
            .collect();

        let mut table = Table::new();
        table.add_row(row![
            b -> "Index",
            b -> "Pubkey",
            b -> "Balance (ETH)",
            b -> "Type",
            b -> "Status",
            b -> "Consolidable"
        ]);
        for summary in &validators {
            match by_index.get(&summary.index) {
                Some(record) => {
                    let consolidable =
                        is_consolidable(record, current_epoch, shard_committee_period);
                    table.add_row(row![
                        record.index,
                        record.pubkey,
                        format_number_with_decimals(U256::from(record.balance), 9)?,
                        record
                            .credential_type()
                            .map(|credential_type| credential_type.as_hex_tag())
                            .unwrap_or("-"),
                        record.status,
                        if consolidable { "✅" } else { "❌" }
                    ]);
                }
                // the detail fetch is best-effort: fall back to the summary
                None => {
                    table.add_row(row![
                        summary.index,
                        summary.public_key,
                        "-",
                        "-",
                        "unknown",
                        "❌"
                    ]);
                }
            }
        }
        table.printstd();

        let txt = format!(
            "{} validators (epoch {}, shard committee period {})",
            validators.len(),
            current_epoch,
            shard_committee_period
        );
        println!("{}", txt.as_str().bright_cyan());

        Ok(())
    }
}
