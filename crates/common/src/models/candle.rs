use serde::{Deserialize, Serialize};

/// One OHLCV bar. `open_time` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Flat bar at `close`, handy when only closing prices matter.
    pub fn from_close(open_time: i64, close: f64) -> Self {
        Self {
            open_time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}
