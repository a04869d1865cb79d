//! Typed views of the validator data API responses.

use std::{fmt, str::FromStr};

use alloy_primitives::{Address, FixedBytes, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A BLS validator public key (48 bytes).
pub type BlsPublicKey = FixedBytes<48>;

/// Epoch sentinel for validators that never activated.
pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

const fn far_future_epoch() -> u64 {
    FAR_FUTURE_EPOCH
}

/// Envelope every data API response is wrapped in.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// Some endpoints return a single object instead of a one-element array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(many) => many,
            OneOrMany::One(one) => vec![one],
        }
    }
}

/// Validator status as reported by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidatorStatus {
    Pending,
    Deposited,
    ExitingOnline,
    ExitingOffline,
    ActiveOnline,
    ActiveOffline,
    Exited,
    Slashed,
    SlashingOnline,
    SlashingOffline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ValidatorStatus {
    /// Statuses in which a validator may take part in a consolidation.
    pub fn allows_consolidation(&self) -> bool {
        matches!(
            self,
            Self::ActiveOnline | Self::ActiveOffline | Self::Deposited
        )
    }
}

/// Withdrawal credential prefix: byte 0 of the 32-byte credentials field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialType {
    /// `0x00` - BLS withdrawal credentials.
    Bls,
    /// `0x01` - execution address withdrawal credentials.
    Execution,
    /// `0x02` - compounding execution address credentials.
    Compounding,
}

impl CredentialType {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Bls),
            0x01 => Some(Self::Execution),
            0x02 => Some(Self::Compounding),
            _ => None,
        }
    }

    pub const fn from_withdrawal_credentials(credentials: &B256) -> Option<Self> {
        Self::from_tag(credentials.0[0])
    }

    /// The prefix as it appears in credential hex strings.
    pub const fn as_hex_tag(&self) -> &'static str {
        match self {
            Self::Bls => "00",
            Self::Execution => "01",
            Self::Compounding => "02",
        }
    }

    /// Only validators with execution-style credentials can take part in a
    /// consolidation.
    pub const fn is_consolidation_capable(&self) -> bool {
        matches!(self, Self::Execution | Self::Compounding)
    }
}

/// Extracts the execution address embedded in `0x01`/`0x02` withdrawal
/// credentials (the last 20 bytes of the 32-byte field).
pub fn extract_withdrawal_address(credentials: &B256) -> Option<Address> {
    match CredentialType::from_withdrawal_credentials(credentials) {
        Some(CredentialType::Execution) | Some(CredentialType::Compounding) => {
            Some(Address::from_slice(&credentials[12..]))
        }
        _ => None,
    }
}

/// One entry of the paginated withdrawal-credentials listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSummary {
    #[serde(rename = "publickey")]
    pub public_key: BlsPublicKey,
    #[serde(rename = "validatorindex")]
    pub index: u64,
}

/// Detailed validator record from the `POST /validator` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorRecord {
    #[serde(rename = "validatorindex")]
    pub index: u64,
    #[serde(rename = "pubkey", alias = "publickey")]
    pub pubkey: BlsPublicKey,
    #[serde(rename = "withdrawalcredentials")]
    pub withdrawal_credentials: B256,
    /// Activation epoch; never-activated validators carry the far-future
    /// sentinel.
    #[serde(rename = "activationepoch", default = "far_future_epoch")]
    pub activation_epoch: u64,
    /// Balance in gwei.
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub status: ValidatorStatus,
}

impl ValidatorRecord {
    pub fn credential_type(&self) -> Option<CredentialType> {
        CredentialType::from_withdrawal_credentials(&self.withdrawal_credentials)
    }
}

/// Query selector for the withdrawal-credentials endpoint: an execution
/// address or a full 32-byte credentials value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsQuery {
    Address(Address),
    Credentials(B256),
}

#[derive(Debug, Error)]
#[error("expected a 20 byte address or 32 byte withdrawal credentials in hex")]
pub struct ParseCredentialsQueryError;

impl fmt::Display for CredentialsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address:#x}"),
            Self::Credentials(credentials) => write!(f, "{credentials:#x}"),
        }
    }
}

impl FromStr for CredentialsQuery {
    type Err = ParseCredentialsQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(address) = s.parse::<Address>() {
            return Ok(Self::Address(address));
        }
        s.parse::<B256>()
            .map(Self::Credentials)
            .map_err(|_| ParseCredentialsQueryError)
    }
}

/// Payload of `GET /epoch/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct EpochData {
    pub epoch: u64,
}

/// The slice of the beacon node spec this tooling cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSpec {
    #[serde(rename = "SHARD_COMMITTEE_PERIOD")]
    pub shard_committee_period: Option<String>,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    fn credentials_with(tag: u8, address: Address) -> B256 {
        let mut credentials = [0u8; 32];
        credentials[0] = tag;
        credentials[12..].copy_from_slice(address.as_slice());
        B256::from(credentials)
    }

    #[test]
    fn credential_type_reads_byte_zero() {
        let address = address!("5fDCb78cA9A1164c13428E5fC9582c8c48Dab69f");
        assert_eq!(
            CredentialType::from_withdrawal_credentials(&credentials_with(0x00, address)),
            Some(CredentialType::Bls)
        );
        assert_eq!(
            CredentialType::from_withdrawal_credentials(&credentials_with(0x01, address)),
            Some(CredentialType::Execution)
        );
        assert_eq!(
            CredentialType::from_withdrawal_credentials(&credentials_with(0x02, address)),
            Some(CredentialType::Compounding)
        );
        assert_eq!(
            CredentialType::from_withdrawal_credentials(&credentials_with(0x03, address)),
            None
        );
    }

    #[test]
    fn withdrawal_address_round_trips_for_execution_tags() {
        let address = address!("5fDCb78cA9A1164c13428E5fC9582c8c48Dab69f");
        for tag in [0x01, 0x02] {
            let extracted = extract_withdrawal_address(&credentials_with(tag, address));
            assert_eq!(extracted, Some(address));
        }
    }

    #[test]
    fn no_withdrawal_address_for_bls_credentials() {
        let address = address!("5fDCb78cA9A1164c13428E5fC9582c8c48Dab69f");
        assert_eq!(extract_withdrawal_address(&credentials_with(0x00, address)), None);
        assert_eq!(extract_withdrawal_address(&credentials_with(0xff, address)), None);
    }

    #[test]
    fn credentials_query_parses_both_lengths() {
        let by_address: CredentialsQuery =
            "0x5fDCb78cA9A1164c13428E5fC9582c8c48Dab69f".parse().unwrap();
        assert!(matches!(by_address, CredentialsQuery::Address(_)));

        let by_credentials: CredentialsQuery =
            "0x0100000000000000000000005fdcb78ca9a1164c13428e5fc9582c8c48dab69f"
                .parse()
                .unwrap();
        assert!(matches!(by_credentials, CredentialsQuery::Credentials(_)));

        assert!("0x1234".parse::<CredentialsQuery>().is_err());
    }

    #[test]
    fn validator_record_accepts_both_pubkey_spellings() {
        let record: ValidatorRecord = serde_json::from_str(
            r#"{
                "validatorindex": 42,
                "publickey": "0x8a9c4d949077fd89190a508a4506f6bc916c6a255abe8eb302e8effc4b72f22a3b34672681f5cba15d4bc3e2b611353c",
                "withdrawalcredentials": "0x0100000000000000000000005fdcb78ca9a1164c13428e5fc9582c8c48dab69f",
                "activationepoch": 1000,
                "balance": 32000000000,
                "status": "active_online"
            }"#,
        )
        .unwrap();
        assert_eq!(record.index, 42);
        assert_eq!(record.status, ValidatorStatus::ActiveOnline);
        assert_eq!(record.credential_type(), Some(CredentialType::Execution));
    }

    #[test]
    fn missing_activation_epoch_defaults_to_far_future() {
        let record: ValidatorRecord = serde_json::from_str(
            r#"{
                "validatorindex": 7,
                "pubkey": "0x8a9c4d949077fd89190a508a4506f6bc916c6a255abe8eb302e8effc4b72f22a3b34672681f5cba15d4bc3e2b611353c",
                "withdrawalcredentials": "0x0100000000000000000000005fdcb78ca9a1164c13428e5fc9582c8c48dab69f"
            }"#,
        )
        .unwrap();
        assert_eq!(record.activation_epoch, FAR_FUTURE_EPOCH);
        assert_eq!(record.status, ValidatorStatus::Unknown);
    }

    #[test]
    fn unknown_status_values_fall_back() {
        let record: ValidatorRecord = serde_json::from_str(
            r#"{
                "validatorindex": 7,
                "pubkey": "0x8a9c4d949077fd89190a508a4506f6bc916c6a255abe8eb302e8effc4b72f22a3b34672681f5cba15d4bc3e2b611353c",
                "withdrawalcredentials": "0x0100000000000000000000005fdcb78ca9a1164c13428e5fc9582c8c48dab69f",
                "status": "some_future_status"
            }"#,
        )
        .unwrap();
        assert_eq!(record.status, ValidatorStatus::Unknown);
        assert!(!record.status.allows_consolidation());
    }
}
