pub mod candle;
pub mod market;
pub mod notification;
pub mod report;
pub mod trade;

pub use candle::Candle;
pub use market::MarketVolume;
pub use notification::Notification;
pub use report::DailyReport;
pub use trade::{Direction, ParseEnumError, Trade, TradeStatus};
