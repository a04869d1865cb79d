//! Client-side plumbing for the beaconcha.in style validator data API:
//! rate-limited fetching, pagination, and protocol constant resolution.

pub mod client;
pub mod error;
pub mod network;
pub mod rate_limit;
pub mod types;

pub use client::{
    BeaconChainClient, BeaconChainConfig, RetryPolicy, DEFAULT_SHARD_COMMITTEE_PERIOD,
};
pub use error::ClientError;
pub use network::Network;
pub use rate_limit::{RateLimiter, RateLimits};
pub use types::{
    extract_withdrawal_address, BlsPublicKey, CredentialType, CredentialsQuery, ValidatorRecord,
    ValidatorStatus, ValidatorSummary, FAR_FUTURE_EPOCH,
};
