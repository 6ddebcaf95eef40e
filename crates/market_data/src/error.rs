use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}: rate limited by exchange")]
    RateLimited(StatusCode),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("max retries exceeded for {0}")]
    RetriesExhausted(String),
    #[error("invalid {field} in payload for {pair}: {value:?}")]
    InvalidNumber {
        pair: String,
        field: &'static str,
        value: String,
    },
    #[error("no data for {0}")]
    NotFound(String),
}

impl MarketDataError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
