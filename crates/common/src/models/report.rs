use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Trade, TradeStatus};

/// End-of-day performance of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    /// Closed trades, in ledger order.
    pub closed: Vec<Trade>,
    /// Pairs that were still open when the day rolled over.
    pub still_open: Vec<String>,
    pub tp_count: usize,
    pub sl_count: usize,
    pub total_pnl: f64,
}

impl DailyReport {
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.still_open.is_empty()
    }
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Daily PnL Summary {}: no trades today.", self.date);
        }

        writeln!(f, "Daily PnL Summary {}", self.date)?;
        writeln!(f)?;
        for trade in &self.closed {
            let pnl = trade.pnl.unwrap_or_default();
            match trade.status {
                TradeStatus::TakeProfit => writeln!(f, "TP {} {:+.2}%", trade.pair, pnl)?,
                _ => writeln!(f, "SL {} {:+.2}%", trade.pair, pnl)?,
            }
        }
        for pair in &self.still_open {
            writeln!(f, "OPEN {} (discarded at rollover)", pair)?;
        }
        writeln!(f)?;
        writeln!(f, "TP hits: {} | SL hits: {}", self.tp_count, self.sl_count)?;
        write!(f, "Total PnL: {:+.2}%", self.total_pnl)
    }
}
