//! Consolidation eligibility rules.

use std::collections::HashSet;

use alloy_primitives::{hex, Address};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use beaconchain::{
    extract_withdrawal_address, BeaconChainClient, BlsPublicKey, ValidatorRecord,
};

/// One validator that failed a consolidation requirement, with the reason and
/// the values that made it fail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidValidator {
    pub pubkey: BlsPublicKey,
    pub reason: String,
    pub details: serde_json::Value,
}

/// Outcome of a consolidation eligibility check.
///
/// Domain failures land here as `valid == false` with itemized reasons;
/// infrastructure failures are reported as errors by the evaluator instead.
/// Computed fresh per request, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_validators: Vec<InvalidValidator>,
    /// The fetched records for every validator in the request; populated on
    /// success.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorRecord>,
}

impl ValidationOutcome {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            invalid_validators: Vec::new(),
            validators: Vec::new(),
        }
    }

    fn invalid(invalid_validators: Vec<InvalidValidator>) -> Self {
        Self {
            valid: false,
            error: Some("Some validators failed validation".to_string()),
            invalid_validators,
            validators: Vec::new(),
        }
    }

    fn success(validators: Vec<ValidatorRecord>) -> Self {
        Self {
            valid: true,
            error: None,
            invalid_validators: Vec::new(),
            validators,
        }
    }
}

/// Whether a validator can take part in a consolidation right now.
///
/// Requires execution-style withdrawal credentials, an activation old enough
/// that `activation_epoch + shard_committee_period < current_epoch`, and an
/// active or deposited status.
pub fn is_consolidable(
    record: &ValidatorRecord,
    current_epoch: u64,
    shard_committee_period: u64,
) -> bool {
    record
        .credential_type()
        .is_some_and(|credential_type| credential_type.is_consolidation_capable())
        && record.activation_epoch.saturating_add(shard_committee_period) < current_epoch
        && record.status.allows_consolidation()
}

/// Checks that every validator in `{target} ∪ sources` satisfies the
/// consolidation requirements and that all of them are withdrawable to
/// `sender`.
///
/// Ineligible validators are collected per key with itemized reasons instead
/// of short-circuiting. Infrastructure failures (epoch fetch, missing data)
/// surface as errors.
pub async fn validate_consolidation(
    beacon: &BeaconChainClient,
    target: &BlsPublicKey,
    sources: &[BlsPublicKey],
    sender: Address,
) -> eyre::Result<ValidationOutcome> {
    debug!(
        %target,
        sources = sources.len(),
        %sender,
        "validating consolidation requirements"
    );

    // target first, then sources, deduplicated in input order
    let mut unique: Vec<BlsPublicKey> = Vec::with_capacity(sources.len() + 1);
    for key in std::iter::once(target).chain(sources.iter()) {
        if !unique.contains(key) {
            unique.push(*key);
        }
    }

    let keys: Vec<String> = unique.iter().map(hex::encode).collect();
    let records = beacon.validators_by_indices_or_pubkeys(&keys).await?;

    if records.len() != unique.len() {
        let found: HashSet<BlsPublicKey> = records.iter().map(|record| record.pubkey).collect();
        let missing: Vec<String> = unique
            .iter()
            .filter(|key| !found.contains(*key))
            .map(|key| format!("{key:#x}"))
            .collect();
        return Ok(ValidationOutcome::failure(format!(
            "Some validators do not exist: {}",
            missing.join(", ")
        )));
    }

    if !records.iter().any(|record| record.pubkey == *target) {
        return Ok(ValidationOutcome::failure(format!(
            "Target validator {target:#x} not found"
        )));
    }
    for source in sources {
        if !records.iter().any(|record| record.pubkey == *source) {
            return Ok(ValidationOutcome::failure(format!(
                "Source validator {source:#x} not found"
            )));
        }
    }

    let current_epoch = beacon.current_epoch().await?;
    let shard_committee_period = beacon.shard_committee_period().await;

    let mut withdrawal_address: Option<Address> = None;
    let mut invalid_validators = Vec::new();

    for record in &records {
        if !is_consolidable(record, current_epoch, shard_committee_period) {
            invalid_validators.push(InvalidValidator {
                pubkey: record.pubkey,
                reason: "Validator is not consolidable".to_string(),
                details: json!({
                    "credtype": record
                        .credential_type()
                        .map(|credential_type| credential_type.as_hex_tag())
                        .unwrap_or(""),
                    "activationEpoch": record.activation_epoch,
                    "currentEpoch": current_epoch,
                    "shardCommitteePeriod": shard_committee_period,
                    "status": record.status,
                }),
            });
            continue;
        }

        let Some(current) = extract_withdrawal_address(&record.withdrawal_credentials) else {
            invalid_validators.push(InvalidValidator {
                pubkey: record.pubkey,
                reason: "Could not extract withdrawal address".to_string(),
                details: json!({ "credentials": record.withdrawal_credentials }),
            });
            continue;
        };

        if current != sender {
            invalid_validators.push(InvalidValidator {
                pubkey: record.pubkey,
                reason: "Withdrawal address does not match sender address".to_string(),
                details: json!({
                    "withdrawalAddress": format!("{current:#x}"),
                    "senderAddress": format!("{sender:#x}"),
                }),
            });
            continue;
        }

        // source and target validators must share one withdrawal owner
        match withdrawal_address {
            None => withdrawal_address = Some(current),
            Some(expected) if expected != current => {
                invalid_validators.push(InvalidValidator {
                    pubkey: record.pubkey,
                    reason: "Inconsistent withdrawal address across validators".to_string(),
                    details: json!({
                        "expectedAddress": format!("{expected:#x}"),
                        "actualAddress": format!("{current:#x}"),
                    }),
                });
            }
            Some(_) => {}
        }
    }

    if !invalid_validators.is_empty() {
        return Ok(ValidationOutcome::invalid(invalid_validators));
    }

    Ok(ValidationOutcome::success(records))
}

#[cfg(test)]
mod tests {
    use beaconchain::{ValidatorStatus, FAR_FUTURE_EPOCH};

    use super::*;

    fn record(tag: u8, activation_epoch: u64, status: ValidatorStatus) -> ValidatorRecord {
        let mut credentials = [0u8; 32];
        credentials[0] = tag;
        credentials[12..].copy_from_slice(&[0x11; 20]);
        ValidatorRecord {
            index: 1,
            pubkey: BlsPublicKey::repeat_byte(0xaa),
            withdrawal_credentials: credentials.into(),
            activation_epoch,
            balance: 32_000_000_000,
            status,
        }
    }

    #[test]
    fn bls_credentials_are_never_consolidable() {
        for tag in [0x00, 0x03, 0xff] {
            let record = record(tag, 0, ValidatorStatus::ActiveOnline);
            assert!(!is_consolidable(&record, u64::MAX, 256));
        }
    }

    #[test]
    fn young_validators_are_not_consolidable() {
        let record = record(0x01, 1000, ValidatorStatus::ActiveOnline);
        // activation_epoch + shard_committee_period must be strictly below
        // the current epoch
        assert!(!is_consolidable(&record, 1256, 256));
        assert!(is_consolidable(&record, 1257, 256));
    }

    #[test]
    fn never_activated_validators_are_not_consolidable() {
        let record = record(0x02, FAR_FUTURE_EPOCH, ValidatorStatus::Pending);
        assert!(!is_consolidable(&record, u64::MAX, 256));
    }

    #[test]
    fn exited_validators_are_not_consolidable() {
        for status in [
            ValidatorStatus::Exited,
            ValidatorStatus::Slashed,
            ValidatorStatus::ExitingOnline,
            ValidatorStatus::Unknown,
        ] {
            let record = record(0x01, 1000, status);
            assert!(!is_consolidable(&record, 100_000, 256));
        }
    }

    #[test]
    fn active_and_deposited_validators_are_consolidable() {
        for status in [
            ValidatorStatus::ActiveOnline,
            ValidatorStatus::ActiveOffline,
            ValidatorStatus::Deposited,
        ] {
            let record = record(0x02, 1000, status);
            assert!(is_consolidable(&record, 100_000, 256));
        }
    }
}
