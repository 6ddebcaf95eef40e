pub mod binance_client;
pub mod exchange_info_response;
pub mod kline_response;
pub mod ticker_response;

pub use binance_client::BinanceFuturesClient;
pub use exchange_info_response::ExchangeInfoResponse;
pub use kline_response::KlineRow;
pub use ticker_response::{Ticker24hResponse, TickerPriceResponse};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
