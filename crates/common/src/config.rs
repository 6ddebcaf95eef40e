use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("fast MA window ({fast}) must be shorter than slow MA window ({slow})")]
    MovingAverageOrder { fast: usize, slow: usize },
    #[error("candle window ({limit}) is shorter than the {name} window ({needed})")]
    WindowTooShort {
        name: &'static str,
        limit: usize,
        needed: usize,
    },
    #[error("{name} must lie in (0, 1), got {value}")]
    OffsetOutOfRange { name: &'static str, value: f64 },
    #[error("RSI thresholds must satisfy 0 <= short ({short}) <= long ({long}) <= 100")]
    RsiThresholds { long: f64, short: f64 },
    #[error("leverage must be a positive number, got {0}")]
    Leverage(f64),
}

/// Immutable strategy parameters shared by signal generation and the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub leverage: f64,
    pub daily_quota: usize,
    pub universe_size: usize,
    pub candle_interval: String,
    pub candle_limit: usize,
    /// Labelled "EMA20" in older messages; it is a simple mean.
    pub ma_fast: usize,
    /// Labelled "EMA50" in older messages; it is a simple mean.
    pub ma_slow: usize,
    pub rsi_period: usize,
    pub rsi_long: f64,
    pub rsi_short: f64,
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            leverage: 20.0,
            daily_quota: 4,
            universe_size: 50,
            candle_interval: "15m".to_string(),
            candle_limit: 50,
            ma_fast: 20,
            ma_slow: 50,
            rsi_period: 14,
            rsi_long: 55.0,
            rsi_short: 45.0,
            take_profit_pct: 0.007,
            stop_loss_pct: 0.007,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("daily quota", self.daily_quota),
            ("universe size", self.universe_size),
            ("candle limit", self.candle_limit),
            ("fast MA window", self.ma_fast),
            ("slow MA window", self.ma_slow),
            ("RSI window", self.rsi_period),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        if self.ma_fast >= self.ma_slow {
            return Err(ConfigError::MovingAverageOrder {
                fast: self.ma_fast,
                slow: self.ma_slow,
            });
        }

        for (name, needed) in [("slow MA", self.ma_slow), ("RSI", self.rsi_period)] {
            if self.candle_limit < needed {
                return Err(ConfigError::WindowTooShort {
                    name,
                    limit: self.candle_limit,
                    needed,
                });
            }
        }

        for (name, value) in [
            ("take-profit offset", self.take_profit_pct),
            ("stop-loss offset", self.stop_loss_pct),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::OffsetOutOfRange { name, value });
            }
        }

        let thresholds_ok = (0.0..=100.0).contains(&self.rsi_short)
            && (0.0..=100.0).contains(&self.rsi_long)
            && self.rsi_short <= self.rsi_long;
        if !thresholds_ok {
            return Err(ConfigError::RsiThresholds {
                long: self.rsi_long,
                short: self.rsi_short,
            });
        }

        if !(self.leverage.is_finite() && self.leverage > 0.0) {
            return Err(ConfigError::Leverage(self.leverage));
        }

        Ok(())
    }
}
