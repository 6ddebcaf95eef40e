use std::time::Duration;

use async_trait::async_trait;
use common::models::{Candle, MarketVolume};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::MarketDataError;
use crate::remote::{ExchangeInfoResponse, KlineRow, Ticker24hResponse, TickerPriceResponse};
use crate::traits::{MarketDataSource, RemoteResponse};

/// Public (unsigned) endpoints of the Binance USD-M futures REST API.
#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl BinanceFuturesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .user_agent("breakout_scanner/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 3,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        let mut retry_count = 0;

        loop {
            match self.make_request(&url, query).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_rate_limit() => {
                    retry_count += 1;
                    if retry_count > self.max_retries {
                        return Err(MarketDataError::RetriesExhausted(path.to_string()));
                    }

                    let backoff_seconds = 2_u64.pow(retry_count);
                    warn!(
                        "Rate limited on {}, backing off for {} seconds (attempt {}/{})",
                        path, backoff_seconds, retry_count, self.max_retries
                    );
                    sleep(Duration::from_secs(backoff_seconds)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            return Err(MarketDataError::RateLimited(status));
        }

        if let Some(used_weight) = response
            .headers()
            .get("x-mbx-used-weight-1m")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
        {
            if used_weight > 1000 {
                warn!("High API weight usage: {}", used_weight);
            } else {
                debug!("Used weights: {}/2400", used_weight);
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status { status, body });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn list_markets(&self) -> Result<Vec<String>, MarketDataError> {
        let info: ExchangeInfoResponse = self.get_json("/fapi/v1/exchangeInfo", &[]).await?;
        Ok(info.tradable_usdt_perpetuals())
    }

    async fn quote_volumes(&self) -> Result<Vec<MarketVolume>, MarketDataError> {
        let tickers: Vec<Ticker24hResponse> = self.get_json("/fapi/v1/ticker/24hr", &[]).await?;

        // A single unparsable ticker shouldn't sink the whole ranking.
        Ok(tickers
            .iter()
            .filter_map(|t| match t.to_model() {
                Ok(volume) => Some(volume),
                Err(e) => {
                    debug!("Skipping ticker: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let query = [
            ("symbol", pair.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<KlineRow> = self.get_json("/fapi/v1/klines", &query).await?;

        if rows.is_empty() {
            return Err(MarketDataError::NotFound(pair.to_string()));
        }
        rows.iter().map(|row| row.to_candle(pair)).collect()
    }

    async fn last_price(&self, pair: &str) -> Result<f64, MarketDataError> {
        let query = [("symbol", pair.to_string())];
        let ticker: TickerPriceResponse = self.get_json("/fapi/v1/ticker/price", &query).await?;
        ticker.to_model()
    }
}
