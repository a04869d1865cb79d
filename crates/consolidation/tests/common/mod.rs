#![allow(dead_code)]

use std::time::Duration;

use alloy_primitives::hex;
use beaconchain::{
    BeaconChainClient, BeaconChainConfig, BlsPublicKey, Network, RateLimits, RetryPolicy,
};
use consolidation::chain::{connect_http, HttpProvider};
use httpmock::prelude::*;
use serde_json::{json, Value};

/// Sender address embedded in the test withdrawal credentials.
pub const SENDER: &str = "0x5fdcb78ca9a1164c13428e5fc9582c8c48dab69f";

/// Hoodi chain id as a hex quantity.
pub const CHAIN_ID_HEX: &str = "0x88bb0";

pub const ZERO_WORD: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

pub fn beacon_client(server: &MockServer) -> BeaconChainClient {
    BeaconChainClient::with_endpoints(
        Network::Hoodi,
        server.base_url(),
        server.url("/spec"),
        BeaconChainConfig {
            api_key: None,
            rate_limits: RateLimits {
                per_second: 1000,
                per_minute: 100_000,
            },
            retry: RetryPolicy {
                backoff: Duration::ZERO,
                max_attempts: Some(1),
            },
        },
    )
}

pub fn rpc_provider(server: &MockServer) -> HttpProvider {
    connect_http(&server.base_url()).unwrap()
}

pub async fn mock_rpc(server: &MockServer, method: &str, result: &str) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(format!(r#"{{"method":"{method}"}}"#));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": result }));
        })
        .await;
}

pub async fn mock_epoch(server: &MockServer, epoch: u64) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/epoch/latest");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "status": "OK", "data": { "epoch": epoch } }));
        })
        .await;
}

pub async fn mock_spec(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spec");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "data": { "SHARD_COMMITTEE_PERIOD": "256" } }));
        })
        .await;
}

pub async fn mock_validators(server: &MockServer, records: Vec<Value>) {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/validator");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "status": "OK", "data": records }));
        })
        .await;
}

pub fn pubkey(byte: u8) -> BlsPublicKey {
    BlsPublicKey::repeat_byte(byte)
}

/// `0x01`/`0x02` withdrawal credentials embedding the given address.
pub fn credentials(tag: u8, address: &str) -> String {
    format!("0x{tag:02x}0000000000000000000000{}", &address[2..])
}

pub fn validator_json(
    index: u64,
    pubkey: &BlsPublicKey,
    withdrawal_credentials: &str,
    activation_epoch: u64,
    status: &str,
) -> Value {
    json!({
        "validatorindex": index,
        "pubkey": format!("0x{}", hex::encode(pubkey)),
        "withdrawalcredentials": withdrawal_credentials,
        "activationepoch": activation_epoch,
        "balance": 32_000_000_000u64,
        "status": status,
    })
}
