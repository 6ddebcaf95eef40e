use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize, Debug)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    #[serde(rename(deserialize = "quoteAsset"))]
    pub quote_asset: String,
    #[serde(rename(deserialize = "contractType"), default)]
    pub contract_type: String,
}

impl ExchangeInfoResponse {
    /// USDT-margined perpetuals currently open for trading.
    pub fn tradable_usdt_perpetuals(&self) -> Vec<String> {
        self.symbols
            .iter()
            .filter(|s| s.status == "TRADING")
            .filter(|s| s.quote_asset == "USDT")
            .filter(|s| s.contract_type == "PERPETUAL")
            .map(|s| s.symbol.clone())
            .collect()
    }
}
