//! Thin JSON-RPC read helpers over an alloy HTTP provider.

use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use reqwest::Client;
use tracing::debug;
use url::Url;

pub type HttpProvider = RootProvider<Http<Client>>;

/// Connects a read-only provider to the given RPC endpoint.
pub fn connect_http(rpc_url: &str) -> eyre::Result<HttpProvider> {
    let url: Url = rpc_url.parse()?;
    Ok(RootProvider::new_http(url))
}

pub async fn get_chain_id(provider: &HttpProvider) -> eyre::Result<u64> {
    Ok(provider.get_chain_id().await?)
}

pub async fn get_gas_price(provider: &HttpProvider) -> eyre::Result<u128> {
    Ok(provider.get_gas_price().await?)
}

pub async fn get_balance(provider: &HttpProvider, address: Address) -> eyre::Result<U256> {
    Ok(provider.get_balance(address).await?)
}

pub async fn get_block_number(provider: &HttpProvider) -> eyre::Result<u64> {
    Ok(provider.get_block_number().await?)
}

/// Reads a raw storage slot at the latest block.
pub async fn get_storage_at(
    provider: &HttpProvider,
    contract: Address,
    slot: U256,
) -> eyre::Result<U256> {
    let value = provider.get_storage_at(contract, slot).await?;
    debug!(%contract, %slot, %value, "raw storage read");
    Ok(value)
}
