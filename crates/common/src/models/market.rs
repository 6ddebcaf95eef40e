use serde::{Deserialize, Serialize};

/// 24h quote-denominated volume of a single market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketVolume {
    pub pair: String,
    pub quote_volume: f64,
}
