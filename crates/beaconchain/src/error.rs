use thiserror::Error;

/// Errors produced by the validator data client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API kept answering 429 past the configured retry ceiling.
    #[error("rate limited by the validator data API after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("validator data API request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("malformed response from the validator data API: {0}")]
    MalformedResponse(String),
}
