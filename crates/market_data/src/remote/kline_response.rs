use common::models::Candle;
use serde::Deserialize;

use crate::error::MarketDataError;
use crate::traits::parse_decimal;

/// One row of `/fapi/v1/klines`, a positional JSON array.
#[derive(Deserialize, Debug)]
pub struct KlineRow(
    pub i64,    // open time
    pub String, // open
    pub String, // high
    pub String, // low
    pub String, // close
    pub String, // volume
    pub i64,    // close time
    pub String, // quote asset volume
    pub u64,    // number of trades
    pub String, // taker buy base volume
    pub String, // taker buy quote volume
    pub String, // ignore
);

impl KlineRow {
    pub fn to_candle(&self, pair: &str) -> Result<Candle, MarketDataError> {
        Ok(Candle {
            open_time: self.0,
            open: parse_decimal(pair, "open", &self.1)?,
            high: parse_decimal(pair, "high", &self.2)?,
            low: parse_decimal(pair, "low", &self.3)?,
            close: parse_decimal(pair, "close", &self.4)?,
            volume: parse_decimal(pair, "volume", &self.5)?,
        })
    }
}
