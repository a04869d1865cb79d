//! Rate-limited HTTP client for the validator data API.

use std::{sync::Arc, time::Duration};

use alloy_primitives::hex;
use parking_lot::RwLock;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::{
    error::ClientError,
    network::Network,
    rate_limit::{RateLimiter, RateLimits},
    types::{
        ApiResponse, BlsPublicKey, ChainSpec, CredentialType, CredentialsQuery, EpochData,
        OneOrMany, ValidatorRecord, ValidatorSummary,
    },
};

/// Page size of the paginated withdrawal-credentials endpoint.
const PAGE_SIZE: usize = 200;

/// Maximum keys per `POST /validator` request.
const CHUNK_SIZE: usize = 100;

/// Canonical SHARD_COMMITTEE_PERIOD, used when the spec endpoint is
/// unreachable or returns garbage.
pub const DEFAULT_SHARD_COMMITTEE_PERIOD: u64 = 256;

/// Backoff policy applied to 429 responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Fixed delay between retries.
    pub backoff: Duration,
    /// Retry ceiling; `None` retries indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BeaconChainConfig {
    pub api_key: Option<String>,
    pub rate_limits: RateLimits,
    pub retry: RetryPolicy,
}

/// Client for one network's validator data API.
///
/// Clones share the rate limiter and the protocol constant cache, so the
/// hosting application can construct one client per network and pass it
/// around freely.
#[derive(Debug, Clone)]
pub struct BeaconChainClient {
    network: Network,
    api_url: String,
    spec_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
    shard_committee_period: Arc<RwLock<Option<u64>>>,
}

impl BeaconChainClient {
    pub fn new(network: Network, config: BeaconChainConfig) -> Self {
        Self::with_endpoints(network, network.api_url(), network.spec_url(), config)
    }

    /// Builds a client against custom endpoints (tests, self-hosted mirrors).
    pub fn with_endpoints(
        network: Network,
        api_url: impl Into<String>,
        spec_url: impl Into<String>,
        config: BeaconChainConfig,
    ) -> Self {
        Self {
            network,
            api_url: api_url.into(),
            spec_url: spec_url.into(),
            api_key: config.api_key,
            http: reqwest::Client::new(),
            limiter: RateLimiter::new(config.rate_limits),
            retry: config.retry,
            shard_committee_period: Arc::new(RwLock::new(None)),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The latest epoch known to the data API.
    ///
    /// Failures propagate: there is no safe default for the current epoch.
    pub async fn current_epoch(&self) -> Result<u64, ClientError> {
        let url = format!("{}/epoch/latest", self.api_url);
        let response = self
            .send_with_retry(|| self.request(Method::GET, &url))
            .await?;
        let body: ApiResponse<EpochData> = response.json().await?;
        body.data
            .map(|data| data.epoch)
            .ok_or_else(|| ClientError::MalformedResponse("missing epoch data".into()))
    }

    /// The network's SHARD_COMMITTEE_PERIOD.
    ///
    /// Resolved once from the beacon node spec endpoint and cached for the
    /// lifetime of the client; any failure falls back to the canonical
    /// [`DEFAULT_SHARD_COMMITTEE_PERIOD`], which is cached as well.
    pub async fn shard_committee_period(&self) -> u64 {
        if let Some(period) = *self.shard_committee_period.read() {
            return period;
        }
        let period = match self.fetch_shard_committee_period().await {
            Ok(period) => {
                debug!(network = %self.network, period, "fetched SHARD_COMMITTEE_PERIOD");
                period
            }
            Err(err) => {
                warn!(
                    network = %self.network,
                    %err,
                    "failed to fetch SHARD_COMMITTEE_PERIOD, using default"
                );
                DEFAULT_SHARD_COMMITTEE_PERIOD
            }
        };
        *self.shard_committee_period.write() = Some(period);
        period
    }

    async fn fetch_shard_committee_period(&self) -> Result<u64, ClientError> {
        // plain config read against the beacon node, not throttled together
        // with the data API
        let response = self
            .http
            .get(&self.spec_url)
            .send()
            .await?
            .error_for_status()?;
        let body: ApiResponse<ChainSpec> = response.json().await?;
        body.data
            .and_then(|spec| spec.shard_committee_period)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| {
                ClientError::MalformedResponse(
                    "missing or non-numeric SHARD_COMMITTEE_PERIOD".into(),
                )
            })
    }

    /// All validators whose withdrawal credentials match `query`.
    ///
    /// Pages through the endpoint until a short or empty page, or until the
    /// last element of a full page repeats the previous page's last element
    /// (some deployments repeat their final page instead of returning an
    /// empty one).
    pub async fn validators_by_withdrawal_credentials(
        &self,
        query: &CredentialsQuery,
    ) -> Result<Vec<ValidatorSummary>, ClientError> {
        let url = format!("{}/validator/withdrawalCredentials/{}", self.api_url, query);
        let mut all = Vec::new();
        let mut offset = 0usize;
        let mut previous_last: Option<ValidatorSummary> = None;

        loop {
            let response = self
                .send_with_retry(|| {
                    self.request(Method::GET, &url)
                        .query(&[("limit", PAGE_SIZE), ("offset", offset)])
                })
                .await?;
            let body: ApiResponse<Vec<ValidatorSummary>> = response.json().await?;
            let page = body.data.unwrap_or_default();

            if page.is_empty() {
                break;
            }
            if page.len() < PAGE_SIZE {
                all.extend(page);
                break;
            }

            let last = page[page.len() - 1].clone();
            if previous_last
                .as_ref()
                .is_some_and(|prev| prev.public_key == last.public_key || prev.index == last.index)
            {
                // the data source repeated its last page: end of data
                break;
            }
            previous_last = Some(last);
            all.extend(page);
            debug!(
                network = %self.network,
                total = all.len(),
                offset,
                "fetched full validator page, advancing"
            );
            offset += PAGE_SIZE;
        }

        Ok(all)
    }

    /// Detailed validator records for the given indices and/or public keys.
    ///
    /// Requests are chunked; a chunk that keeps failing is dropped from the
    /// combined result, so callers that need completeness must cross-check
    /// the returned count against the requested one.
    pub async fn validators_by_indices_or_pubkeys(
        &self,
        keys: &[String],
    ) -> Result<Vec<ValidatorRecord>, ClientError> {
        let url = format!("{}/validator", self.api_url);
        let mut all = Vec::new();

        for chunk in keys.chunks(CHUNK_SIZE) {
            let body = serde_json::json!({ "indicesOrPubkey": chunk.join(",") });
            let response = match self
                .send_with_retry(|| self.request(Method::POST, &url).json(&body))
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    error!(
                        network = %self.network,
                        %err,
                        "failed to fetch validator chunk, skipping"
                    );
                    continue;
                }
            };
            match response.json::<ApiResponse<OneOrMany<ValidatorRecord>>>().await {
                Ok(parsed) => {
                    if let Some(data) = parsed.data {
                        all.extend(Vec::from(data));
                    }
                }
                Err(err) => {
                    warn!(
                        network = %self.network,
                        %err,
                        "malformed validator chunk response, skipping"
                    );
                }
            }
        }

        Ok(all)
    }

    /// The credential type of a single validator, if it can be determined.
    pub async fn validator_credential_type(
        &self,
        pubkey: &BlsPublicKey,
    ) -> Result<Option<CredentialType>, ClientError> {
        debug!(network = %self.network, %pubkey, "fetching validator credential type");
        // the API accepts un-prefixed keys
        let key = hex::encode(pubkey);
        let records = self
            .validators_by_indices_or_pubkeys(std::slice::from_ref(&key))
            .await?;
        Ok(records
            .into_iter()
            .find(|record| record.pubkey == *pubkey)
            .and_then(|record| record.credential_type()))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.header("apikey", api_key);
        }
        builder
    }

    /// Sends a request through the rate limiter, retrying 429 responses with
    /// the configured backoff until one passes or the ceiling is reached.
    async fn send_with_retry<F>(&self, mut build: F) -> Result<Response, ClientError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut attempts = 0u32;
        loop {
            self.limiter.acquire().await;
            let response = build().send().await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;
                if self.retry.max_attempts.is_some_and(|max| attempts > max) {
                    return Err(ClientError::RateLimited { attempts });
                }
                warn!(
                    backoff = ?self.retry.backoff,
                    "rate limit exceeded, waiting before retrying"
                );
                sleep(self.retry.backoff).await;
                continue;
            }
            return Ok(response.error_for_status()?);
        }
    }
}
