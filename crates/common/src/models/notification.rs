use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DailyReport, Trade, TradeStatus};

/// Events pushed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    TradeOpened(Trade),
    TradeClosed { trade: Trade, price: f64 },
    DailySummary(DailyReport),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TradeOpened(trade) => {
                let risk = (trade.entry - trade.stop_loss).abs();
                let reward = (trade.take_profit - trade.entry).abs();
                writeln!(f, "{} Futures", trade.pair)?;
                writeln!(f, "{} Trade", trade.direction)?;
                writeln!(f, "Entry: {}", price(trade.entry))?;
                writeln!(
                    f,
                    "SL: {} | TP: {}",
                    price(trade.stop_loss),
                    price(trade.take_profit)
                )?;
                write!(f, "RR: {:.2}", reward / risk)
            }
            Self::TradeClosed { trade, price: last } => {
                let pnl = trade.pnl.unwrap_or_default();
                let label = match trade.status {
                    TradeStatus::TakeProfit => "TP Hit",
                    TradeStatus::StopLoss => "SL Hit",
                    TradeStatus::Open => "Update",
                };
                write!(
                    f,
                    "{}: {} {:+.2}% (last {})",
                    label,
                    trade.pair,
                    pnl,
                    price(*last)
                )
            }
            Self::DailySummary(report) => write!(f, "{}", report),
        }
    }
}

/// Renders a price with enough decimals for sub-cent markets.
fn price(value: f64) -> String {
    let abs = value.abs();
    if abs >= 100.0 {
        format!("{:.2}", value)
    } else if abs >= 1.0 {
        format!("{:.4}", value)
    } else {
        format!("{:.8}", value)
    }
}
