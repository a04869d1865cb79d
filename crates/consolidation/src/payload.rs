//! Assembly of unsigned consolidation transaction payloads.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use beaconchain::{BeaconChainClient, BlsPublicKey, CredentialType};

use crate::{
    chain::{self, HttpProvider},
    consts::{get_consolidation_contract, CONSOLIDATION_TX_GAS},
    eligibility::validate_consolidation,
    fee::consolidation_fee,
};

/// An unsigned transaction ready to be handed to an external signer.
///
/// Immutable once returned; quantities are serialized as hex so the JSON can
/// be passed to a wallet verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub sender: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    #[serde(with = "alloy_serde::quantity")]
    pub gas: u64,
    #[serde(with = "alloy_serde::quantity")]
    pub gas_price: u128,
    pub data: Bytes,
    #[serde(with = "alloy_serde::quantity")]
    pub chain_id: u64,
}

/// A transaction payload plus what it is for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationPayload {
    pub payload: TransactionPayload,
    pub is_conversion_tx: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_self_consolidation: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_pubkey: Option<BlsPublicKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pubkey: Option<BlsPublicKey>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Calldata of one consolidation request: source pubkey followed by target
/// pubkey, 96 bytes.
fn consolidation_call_data(source: &BlsPublicKey, target: &BlsPublicKey) -> Bytes {
    let mut data = Vec::with_capacity(96);
    data.extend_from_slice(source.as_slice());
    data.extend_from_slice(target.as_slice());
    data.into()
}

/// Builds one unsigned transaction, pricing it at the network's current gas
/// price plus 20%, rounded to the nearest wei. Prices are read at build time
/// and payloads are not re-priced afterwards.
async fn build_tx_payload(
    provider: &HttpProvider,
    data: Bytes,
    to: Address,
    sender: Address,
    value: U256,
    gas: u64,
) -> eyre::Result<TransactionPayload> {
    let chain_id = chain::get_chain_id(provider).await?;
    let gas_price = chain::get_gas_price(provider).await?;
    let gas_price = (gas_price * 6 + 2) / 5;

    Ok(TransactionPayload {
        sender,
        from: sender,
        to,
        value,
        gas,
        gas_price,
        data,
        chain_id,
    })
}

/// Assembles the ordered transaction sequence for a consolidation request.
///
/// A single source equal to the target is a self-consolidation: the request
/// is validated and exactly one credential conversion transaction is built.
/// Otherwise one transaction per source is emitted in the caller-supplied
/// order, preceded by a conversion transaction when the target does not have
/// compounding (`0x02`) credentials yet. Eligibility of the regular path is
/// expected to have been validated by the caller beforehand.
///
/// Any failure aborts the whole build; no partial payload list is returned.
pub async fn build_consolidation_payloads(
    beacon: &BeaconChainClient,
    provider: &HttpProvider,
    target: &BlsPublicKey,
    sources: &[BlsPublicKey],
    sender: Address,
) -> eyre::Result<Vec<ConsolidationPayload>> {
    let network = beacon.network();
    let contract = get_consolidation_contract(network.chain_id())?;
    let fee = consolidation_fee(provider, network).await;
    debug!(%network, %fee, "consolidation fee");

    if sources.len() == 1 && sources[0] == *target {
        debug!("self-consolidation detected (target == source), checking for credential conversion");

        let outcome = validate_consolidation(beacon, target, sources, sender).await?;
        if !outcome.valid {
            eyre::bail!(
                "Validator validation failed: {}",
                outcome.error.unwrap_or_default()
            );
        }

        let credential_type = beacon
            .validator_credential_type(target)
            .await?
            .ok_or_else(|| {
                eyre::eyre!("Cannot determine credential type for validator {target:#x}")
            })?;
        if credential_type != CredentialType::Execution {
            eyre::bail!(
                "Self-consolidation is only allowed for validators with credential type 01 \
                 (BLS credentials). Validator {target:#x} has credential type {}",
                credential_type.as_hex_tag()
            );
        }

        let payload = build_tx_payload(
            provider,
            consolidation_call_data(target, target),
            contract,
            sender,
            fee,
            CONSOLIDATION_TX_GAS,
        )
        .await?;
        return Ok(vec![ConsolidationPayload {
            payload,
            is_conversion_tx: true,
            is_self_consolidation: true,
            description: "Self-consolidation: conversion from BLS (01) to execution (02) \
                          credentials"
                .to_string(),
            source_pubkey: Some(*target),
            target_pubkey: Some(*target),
        }]);
    }

    // regular flow: eligibility is validated by the caller before payloads
    // are built
    let target_credential_type = match beacon.validator_credential_type(target).await {
        Ok(credential_type) => credential_type,
        Err(err) => {
            warn!(%err, "failed to resolve target credential type");
            None
        }
    };

    let mut payloads = Vec::with_capacity(sources.len() + 1);

    if let Some(credential_type) = target_credential_type {
        if credential_type != CredentialType::Compounding {
            debug!(
                credential_type = credential_type.as_hex_tag(),
                "target needs conversion to type 02"
            );
            let payload = build_tx_payload(
                provider,
                consolidation_call_data(target, target),
                contract,
                sender,
                fee,
                CONSOLIDATION_TX_GAS,
            )
            .await?;
            payloads.push(ConsolidationPayload {
                payload,
                is_conversion_tx: true,
                is_self_consolidation: false,
                description: "Conversion transaction to change target validator credential type \
                              to 02"
                    .to_string(),
                source_pubkey: Some(*target),
                target_pubkey: Some(*target),
            });
        }
    }

    for source in sources {
        let payload = build_tx_payload(
            provider,
            consolidation_call_data(source, target),
            contract,
            sender,
            fee,
            CONSOLIDATION_TX_GAS,
        )
        .await?;
        payloads.push(ConsolidationPayload {
            payload,
            is_conversion_tx: false,
            is_self_consolidation: false,
            description: "Consolidation transaction for single validator".to_string(),
            source_pubkey: Some(*source),
            target_pubkey: Some(*target),
        });
    }

    Ok(payloads)
}
