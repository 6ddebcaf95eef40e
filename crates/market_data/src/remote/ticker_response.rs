use common::models::MarketVolume;
use serde::Deserialize;

use crate::error::MarketDataError;
use crate::traits::{RemoteResponse, parse_decimal};

#[derive(Deserialize, Debug)]
pub struct Ticker24hResponse {
    pub symbol: String,
    #[serde(rename(deserialize = "quoteVolume"))]
    pub quote_volume: String,
}

impl RemoteResponse<MarketVolume> for Ticker24hResponse {
    fn to_model(&self) -> Result<MarketVolume, MarketDataError> {
        Ok(MarketVolume {
            pair: self.symbol.clone(),
            quote_volume: parse_decimal(&self.symbol, "quoteVolume", &self.quote_volume)?,
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

impl RemoteResponse<f64> for TickerPriceResponse {
    fn to_model(&self) -> Result<f64, MarketDataError> {
        parse_decimal(&self.symbol, "price", &self.price)
    }
}
