use alloy_primitives::{Address, U256};
use clap::Parser;
use colored::Colorize;
use prettytable::{row, Table};
use valcon_cli_runner::CliContext;

use std::path::PathBuf;

use beaconchain::BlsPublicKey;
use consolidation::{
    build_consolidation_payloads,
    chain::{connect_http, get_balance, get_chain_id},
    validate_consolidation,
};

use crate::{
    common::{BeaconApiCliArgs, Networks},
    utils::{
        print_error_message, print_loading_until_async, print_success_message, write_to_json_file,
    },
};

#[derive(Debug, Parser)]
#[clap(about = "Validate a consolidation request and build the unsigned transaction payloads.")]
pub struct ConsolidateCommand {
    #[arg(
        value_name = "SENDER",
        help = "The address that will sign and fund the consolidation transactions. Must be the \
                withdrawal address of every validator involved."
    )]
    sender: Address,

    #[arg(long, value_name = "PUBKEY", help = "Target validator public key (48 byte hex).")]
    target: BlsPublicKey,

    #[arg(
        long,
        value_name = "PUBKEYS",
        value_delimiter = ',',
        required = true,
        help = "Source validator public keys, consolidated into the target in the given order. \
                Passing the target itself as the only source performs a credential upgrade."
    )]
    sources: Vec<BlsPublicKey>,

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
        help = "The network to consolidate on."
    )]
    network: Networks,

    #[clap(flatten)]
    beacon: BeaconApiCliArgs,

    #[arg(
        long,
        value_name = "PATH",
        help = "Also write the payloads as JSON to this file. The file must not exist yet."
    )]
    out: Option<PathBuf>,
}

impl ConsolidateCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let Self {
            sender,
            target,
            sources,
            rpc_url,
            network,
            beacon,
            out,
        } = self;

        let network = network.to_network();
        let client = beacon.client(network);
        let provider = connect_http(&rpc_url)?;

        let chain_id = get_chain_id(&provider).await?;
        if chain_id != network.chain_id() {
            eyre::bail!(
                "RPC endpoint is on chain {chain_id}, expected {} for {network}",
                network.chain_id()
            );
        }
        tracing::debug!(chain_id, %network, "connected to RPC endpoint");

        let outcome = print_loading_until_async(
            "Validating consolidation requirements",
            validate_consolidation(&client, &target, &sources, sender),
        )
        .await?;
        if !outcome.valid {
            print_error_message(
                outcome
                    .error
                    .as_deref()
                    .unwrap_or("Consolidation validation failed"),
            );
            if !outcome.invalid_validators.is_empty() {
                let mut table = Table::new();
                table.add_row(row![b -> "Pubkey", b -> "Reason", b -> "Details"]);
                for invalid in &outcome.invalid_validators {
                    table.add_row(row![invalid.pubkey, invalid.reason, invalid.details]);
                }
                table.printstd();
            }
            return Ok(());
        }

        let payloads = print_loading_until_async(
            "Building consolidation payloads",
            build_consolidation_payloads(&client, &provider, &target, &sources, sender),
        )
        .await?;

        // pre-flight: the sender must be able to cover the attached fees
        let total_value: U256 = payloads.iter().map(|p| p.payload.value).sum();
        let balance = get_balance(&provider, sender).await?;
        if balance < total_value {
            let txt = format!(
                "Warning: sender balance of {balance} wei does not cover the {total_value} wei \
                 of attached fees"
            );
            println!("{}", txt.as_str().bright_yellow());
        }

        println!("{}", serde_json::to_string_pretty(&payloads)?);

        if let Some(path) = out {
            write_to_json_file(&path, &payloads, true).map_err(|err| eyre::eyre!(err))?;
            print_success_message(&format!(
                "Wrote {} payloads to {}",
                payloads.len(),
                path.display()
            ));
        }

        Ok(())
    }
}
