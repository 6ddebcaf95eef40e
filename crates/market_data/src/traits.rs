use async_trait::async_trait;
use common::models::{Candle, MarketVolume};

use crate::error::MarketDataError;

/// Read-only access to an exchange. Every call fails independently so callers
/// can skip just the market involved.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Tradable markets eligible for scanning.
    async fn list_markets(&self) -> Result<Vec<String>, MarketDataError>;

    /// 24h quote-denominated volume for every market the exchange reports.
    async fn quote_volumes(&self) -> Result<Vec<MarketVolume>, MarketDataError>;

    /// Most recent `limit` candles of `interval`, oldest first.
    async fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    async fn last_price(&self, pair: &str) -> Result<f64, MarketDataError>;
}

/// Conversion from a wire payload into a domain model.
pub trait RemoteResponse<T> {
    fn to_model(&self) -> Result<T, MarketDataError>;
}

pub(crate) fn parse_decimal(
    pair: &str,
    field: &'static str,
    value: &str,
) -> Result<f64, MarketDataError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarketDataError::InvalidNumber {
            pair: pair.to_string(),
            field,
            value: value.to_string(),
        })
}
