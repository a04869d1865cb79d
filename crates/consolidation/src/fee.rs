//! EIP-7251 consolidation fee computation.

use alloy_primitives::U256;
use tracing::{debug, error};

use beaconchain::Network;

use crate::{
    chain::{self, HttpProvider},
    consts::{get_consolidation_contract, QUEUE_EXCESS_INHIBITOR, QUEUE_EXCESS_SLOT},
};

/// Required fee in wei for one consolidation request, given the current
/// queue excess.
///
/// Fake-exponential approximation from the EIP-7251 fee specification with
/// factor 1 and denominator 17. Pure integer math with floor division, so the
/// same input always yields the same fee.
pub fn required_fee(queue_excess: U256) -> U256 {
    let denominator = U256::from(17u64);
    let mut i = U256::from(1u64);
    let mut output = U256::ZERO;
    let mut numerator_accum = denominator; // factor * denominator

    while numerator_accum > U256::ZERO {
        output += numerator_accum;
        numerator_accum = numerator_accum * queue_excess / (denominator * i);
        i += U256::from(1u64);
    }

    output / denominator
}

/// Reads the consolidation queue excess from the contract's storage.
pub async fn queue_length(provider: &HttpProvider, network: Network) -> eyre::Result<U256> {
    let contract = get_consolidation_contract(network.chain_id())?;
    let value = chain::get_storage_at(provider, contract, QUEUE_EXCESS_SLOT).await?;
    debug!(%network, queue = %value, "consolidation queue length");
    Ok(value)
}

/// The fee to attach to each consolidation transaction right now.
///
/// A failed read degrades to a zero fee rather than blocking the operation;
/// the failure is surfaced in the logs.
pub async fn consolidation_fee(provider: &HttpProvider, network: Network) -> U256 {
    match queue_length(provider, network).await {
        Ok(queue) if queue == QUEUE_EXCESS_INHIBITOR => {
            debug!(%network, "queue excess is inhibited, treating fee as zero");
            U256::ZERO
        }
        Ok(queue) => required_fee(queue),
        Err(err) => {
            error!(
                %network,
                %err,
                "failed to read consolidation queue length, proceeding with zero fee"
            );
            U256::ZERO
        }
    }
}
