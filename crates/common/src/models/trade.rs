use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "TP")]
    TakeProfit,
    #[serde(rename = "SL")]
    StopLoss,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(Self::Long),
            "SHORT" => Ok(Self::Short),
            other => Err(ParseEnumError {
                kind: "direction",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::TakeProfit => write!(f, "TP"),
            Self::StopLoss => write!(f, "SL"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "TP" => Ok(Self::TakeProfit),
            "SL" => Ok(Self::StopLoss),
            other => Err(ParseEnumError {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Exchange symbol for a stored pair: `BTC/USDT` and `BTC/USDT:USDT` both
/// become `BTCUSDT`.
pub fn normalize_pair(pair: &str) -> String {
    let base = pair.split(':').next().unwrap_or(pair);
    base.replace('/', "")
}

fn exchange_symbol<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let pair = String::deserialize(deserializer)?;
    Ok(normalize_pair(&pair))
}

/// A simulated futures position.
///
/// The serialized keys match the `trades.json` layout written by earlier
/// versions of the bot, which carried neither an id nor timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(deserialize_with = "exchange_symbol")]
    pub pair: String,
    pub direction: Direction,
    pub entry: f64,
    #[serde(rename = "tp")]
    pub take_profit: f64,
    #[serde(rename = "sl")]
    pub stop_loss: f64,
    pub status: TradeStatus,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default = "Utc::now")]
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// Opens a trade at `entry`. Offsets are fractions of the entry price
    /// (0.007 = 0.7%).
    pub fn open(
        pair: impl Into<String>,
        direction: Direction,
        entry: f64,
        take_profit_pct: f64,
        stop_loss_pct: f64,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let (take_profit, stop_loss) = match direction {
            Direction::Long => (entry * (1.0 + take_profit_pct), entry * (1.0 - stop_loss_pct)),
            Direction::Short => (entry * (1.0 - take_profit_pct), entry * (1.0 + stop_loss_pct)),
        };

        Self {
            id: Uuid::new_v4(),
            pair: pair.into(),
            direction,
            entry,
            take_profit,
            stop_loss,
            status: TradeStatus::Open,
            pnl: None,
            opened_at,
            closed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Price ordering: `sl < entry < tp` for longs, `tp < entry < sl` for shorts.
    pub fn has_valid_levels(&self) -> bool {
        let finite = self.entry.is_finite()
            && self.take_profit.is_finite()
            && self.stop_loss.is_finite();

        finite
            && match self.direction {
                Direction::Long => self.stop_loss < self.entry && self.entry < self.take_profit,
                Direction::Short => self.take_profit < self.entry && self.entry < self.stop_loss,
            }
    }

    /// Closed trades carry a PnL, open ones don't.
    pub fn has_consistent_outcome(&self) -> bool {
        self.is_open() == self.pnl.is_none()
    }

    /// Threshold crossed by `price`, if any. Take-profit is tested first so a
    /// tick satisfying both conditions resolves as a win.
    pub fn evaluate(&self, price: f64) -> Option<TradeStatus> {
        let (hit_tp, hit_sl) = match self.direction {
            Direction::Long => (price >= self.take_profit, price <= self.stop_loss),
            Direction::Short => (price <= self.take_profit, price >= self.stop_loss),
        };

        if hit_tp {
            Some(TradeStatus::TakeProfit)
        } else if hit_sl {
            Some(TradeStatus::StopLoss)
        } else {
            None
        }
    }

    /// Leveraged percentage return when exiting at `exit_price`.
    pub fn pnl_at(&self, exit_price: f64, leverage: f64) -> f64 {
        let change = match self.direction {
            Direction::Long => (exit_price - self.entry) / self.entry,
            Direction::Short => (self.entry - exit_price) / self.entry,
        };
        change * leverage * 100.0
    }

    /// Moves an open trade into `status`, booking PnL at the stored threshold
    /// rather than the observed price. Returns `None` if the trade is already
    /// closed or `status` is not a closing status.
    pub fn close(&mut self, status: TradeStatus, leverage: f64, at: DateTime<Utc>) -> Option<f64> {
        if !self.is_open() {
            return None;
        }

        let exit_price = match status {
            TradeStatus::TakeProfit => self.take_profit,
            TradeStatus::StopLoss => self.stop_loss,
            TradeStatus::Open => return None,
        };

        let pnl = self.pnl_at(exit_price, leverage);
        self.status = status;
        self.pnl = Some(pnl);
        self.closed_at = Some(at);
        Some(pnl)
    }
}
