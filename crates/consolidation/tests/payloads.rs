mod common;

use alloy_primitives::{address, Address, U256};
use consolidation::{build_consolidation_payloads, consolidation_fee};
use httpmock::prelude::*;

use beaconchain::Network;
use common::*;

const GAS_PRICE_HEX: &str = "0x3b9aca00"; // 1 gwei

fn sender() -> Address {
    SENDER.parse().unwrap()
}

async fn mock_chain_reads(rpc: &MockServer, queue_excess: &str) {
    mock_rpc(rpc, "eth_chainId", CHAIN_ID_HEX).await;
    mock_rpc(rpc, "eth_gasPrice", GAS_PRICE_HEX).await;
    mock_rpc(rpc, "eth_getStorageAt", queue_excess).await;
}

#[tokio::test]
async fn self_consolidation_builds_single_conversion_payload() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    mock_validators(
        &beacon,
        vec![validator_json(
            1,
            &target,
            &credentials(0x01, SENDER),
            1000,
            "active_online",
        )],
    )
    .await;
    mock_epoch(&beacon, 400_000).await;
    mock_spec(&beacon).await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let payloads = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[target],
        sender(),
    )
    .await
    .unwrap();

    assert_eq!(payloads.len(), 1);
    let conversion = &payloads[0];
    assert!(conversion.is_conversion_tx);
    assert!(conversion.is_self_consolidation);
    assert_eq!(conversion.source_pubkey, Some(target));
    assert_eq!(conversion.target_pubkey, Some(target));

    let mut expected_data = target.as_slice().to_vec();
    expected_data.extend_from_slice(target.as_slice());
    assert_eq!(conversion.payload.data.as_ref(), expected_data.as_slice());

    // queue excess of zero prices the request at exactly one wei
    assert_eq!(conversion.payload.value, U256::from(1u64));
    assert_eq!(conversion.payload.gas, 91_000);
    assert_eq!(conversion.payload.gas_price, 1_200_000_000);
    assert_eq!(conversion.payload.chain_id, Network::Hoodi.chain_id());
    assert_eq!(
        conversion.payload.to,
        address!("0000BBdDc7CE488642fb579F8B00f3a590007251")
    );
    assert_eq!(conversion.payload.from, sender());
}

#[tokio::test]
async fn self_consolidation_rejects_already_converted_target() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    mock_validators(
        &beacon,
        vec![validator_json(
            1,
            &target,
            &credentials(0x02, SENDER),
            1000,
            "active_online",
        )],
    )
    .await;
    mock_epoch(&beacon, 400_000).await;
    mock_spec(&beacon).await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let err = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[target],
        sender(),
    )
    .await
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("only allowed for validators with credential type 01"));
}

#[tokio::test]
async fn self_consolidation_rejects_ineligible_validator() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    // activation too recent for the shard committee period to have elapsed
    mock_validators(
        &beacon,
        vec![validator_json(
            1,
            &target,
            &credentials(0x01, SENDER),
            399_900,
            "active_online",
        )],
    )
    .await;
    mock_epoch(&beacon, 400_000).await;
    mock_spec(&beacon).await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let err = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[target],
        sender(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Validator validation failed"));
}

#[tokio::test]
async fn regular_consolidation_preserves_source_order() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    let source_one = pubkey(0xb1);
    let source_two = pubkey(0xb2);
    mock_validators(
        &beacon,
        vec![validator_json(
            1,
            &target,
            &credentials(0x02, SENDER),
            1000,
            "active_online",
        )],
    )
    .await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let payloads = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[source_one, source_two],
        sender(),
    )
    .await
    .unwrap();

    // target already has compounding credentials: no conversion transaction
    assert_eq!(payloads.len(), 2);
    assert!(payloads.iter().all(|p| !p.is_conversion_tx));
    assert_eq!(payloads[0].source_pubkey, Some(source_one));
    assert_eq!(payloads[1].source_pubkey, Some(source_two));
    assert_eq!(&payloads[0].payload.data[..48], source_one.as_slice());
    assert_eq!(&payloads[0].payload.data[48..], target.as_slice());
}

#[tokio::test]
async fn regular_consolidation_prepends_conversion_for_unconverted_target() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    let source = pubkey(0xb1);
    mock_validators(
        &beacon,
        vec![validator_json(
            1,
            &target,
            &credentials(0x01, SENDER),
            1000,
            "active_online",
        )],
    )
    .await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let payloads = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[source],
        sender(),
    )
    .await
    .unwrap();

    assert_eq!(payloads.len(), 2);
    assert!(payloads[0].is_conversion_tx);
    assert!(!payloads[0].is_self_consolidation);
    let mut conversion_data = target.as_slice().to_vec();
    conversion_data.extend_from_slice(target.as_slice());
    assert_eq!(payloads[0].payload.data.as_ref(), conversion_data.as_slice());
    assert!(!payloads[1].is_conversion_tx);
    assert_eq!(payloads[1].source_pubkey, Some(source));
}

#[tokio::test]
async fn unknown_target_credential_type_skips_conversion() {
    let beacon = MockServer::start_async().await;
    let rpc = MockServer::start_async().await;

    let target = pubkey(0xaa);
    let source = pubkey(0xb1);
    mock_validators(&beacon, vec![]).await;
    mock_chain_reads(&rpc, ZERO_WORD).await;

    let payloads = build_consolidation_payloads(
        &beacon_client(&beacon),
        &rpc_provider(&rpc),
        &target,
        &[source],
        sender(),
    )
    .await
    .unwrap();

    assert_eq!(payloads.len(), 1);
    assert!(!payloads[0].is_conversion_tx);
}

#[tokio::test]
async fn inhibited_queue_excess_reads_as_zero_fee() {
    let rpc = MockServer::start_async().await;
    mock_rpc(
        &rpc,
        "eth_getStorageAt",
        "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    )
    .await;

    let fee = consolidation_fee(&rpc_provider(&rpc), Network::Hoodi).await;
    assert_eq!(fee, U256::ZERO);
}

#[tokio::test]
async fn failed_queue_read_degrades_to_zero_fee() {
    let rpc = MockServer::start_async().await;
    // no storage mock: the RPC call fails

    let fee = consolidation_fee(&rpc_provider(&rpc), Network::Hoodi).await;
    assert_eq!(fee, U256::ZERO);
}

#[tokio::test]
async fn fee_reflects_queue_excess() {
    let rpc = MockServer::start_async().await;
    mock_rpc(
        &rpc,
        "eth_getStorageAt",
        "0x0000000000000000000000000000000000000000000000000000000000000011",
    )
    .await;

    // queue excess of 17 prices the request at two wei
    let fee = consolidation_fee(&rpc_provider(&rpc), Network::Hoodi).await;
    assert_eq!(fee, U256::from(2u64));
}
