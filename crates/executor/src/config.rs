use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use chrono_tz::Tz;
use common::config::StrategyConfig;
use market_data::remote::DEFAULT_BASE_URL;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Json(String),
    Sqlite(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub scan_interval: Duration,
    pub summary_hour: u32,
    pub summary_timezone: Tz,
    pub binance_base_url: String,
    pub store: StoreBackend,
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = StrategyConfig::default();

        let strategy = StrategyConfig {
            leverage: parse_or(&lookup, "LEVERAGE", defaults.leverage)?,
            daily_quota: parse_or(&lookup, "SIGNALS_PER_DAY", defaults.daily_quota)?,
            universe_size: parse_or(&lookup, "UNIVERSE_SIZE", defaults.universe_size)?,
            candle_interval: lookup("CANDLE_INTERVAL").unwrap_or(defaults.candle_interval),
            candle_limit: parse_or(&lookup, "CANDLE_LIMIT", defaults.candle_limit)?,
            ma_fast: parse_or(&lookup, "MA_FAST", defaults.ma_fast)?,
            ma_slow: parse_or(&lookup, "MA_SLOW", defaults.ma_slow)?,
            rsi_period: parse_or(&lookup, "RSI_PERIOD", defaults.rsi_period)?,
            rsi_long: parse_or(&lookup, "RSI_LONG", defaults.rsi_long)?,
            rsi_short: parse_or(&lookup, "RSI_SHORT", defaults.rsi_short)?,
            take_profit_pct: parse_or(&lookup, "TAKE_PROFIT_PCT", defaults.take_profit_pct)?,
            stop_loss_pct: parse_or(&lookup, "STOP_LOSS_PCT", defaults.stop_loss_pct)?,
        };
        strategy.validate().context("Invalid strategy configuration")?;

        let summary_hour: u32 = parse_or(&lookup, "SUMMARY_HOUR", 0)?;
        if summary_hour > 23 {
            bail!(
                "SUMMARY_HOUR must be between 0 and 23, got {}",
                summary_hour
            );
        }

        let tz_name = lookup("SUMMARY_TIMEZONE").unwrap_or_else(|| "Asia/Kolkata".to_string());
        let summary_timezone = tz_name
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid SUMMARY_TIMEZONE {:?}: {}", tz_name, e))?;

        let scan_secs: u64 = parse_or(&lookup, "SCAN_INTERVAL_SECS", 900)?;
        if scan_secs == 0 {
            bail!("SCAN_INTERVAL_SECS must be greater than zero");
        }

        let store = match lookup("DATABASE_URL") {
            Some(url) => StoreBackend::Sqlite(url),
            None => StoreBackend::Json(
                lookup("TRADES_FILE").unwrap_or_else(|| "trades.json".to_string()),
            ),
        };

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id: chat_id
                    .parse()
                    .context("TELEGRAM_CHAT_ID must be a number")?,
            }),
            (None, None) => None,
            _ => bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together"),
        };

        Ok(Self {
            strategy,
            scan_interval: Duration::from_secs(scan_secs),
            summary_hour,
            summary_timezone,
            binance_base_url: lookup("BINANCE_FUTURES_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            store,
            telegram,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid {} {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_stock_bot() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.strategy, StrategyConfig::default());
        assert_eq!(config.scan_interval, Duration::from_secs(900));
        assert_eq!(config.summary_hour, 0);
        assert_eq!(config.summary_timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.store, StoreBackend::Json("trades.json".to_string()));
        assert_eq!(config.binance_base_url, DEFAULT_BASE_URL);
        assert!(config.telegram.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("LEVERAGE", "10"),
            ("SIGNALS_PER_DAY", "6"),
            ("SUMMARY_TIMEZONE", "UTC"),
            ("SUMMARY_HOUR", "23"),
            ("DATABASE_URL", "sqlite:ledger.db"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-1001"),
        ])
        .unwrap();

        assert_eq!(config.strategy.leverage, 10.0);
        assert_eq!(config.strategy.daily_quota, 6);
        assert_eq!(config.summary_timezone, chrono_tz::UTC);
        assert_eq!(
            config.store,
            StoreBackend::Sqlite("sqlite:ledger.db".to_string())
        );
        assert_eq!(
            config.telegram,
            Some(TelegramConfig {
                token: "123:abc".to_string(),
                chat_id: -1001
            })
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("SIGNALS_PER_DAY", "four")]).is_err());
        assert!(config_from(&[("SUMMARY_HOUR", "24")]).is_err());
        assert!(config_from(&[("SUMMARY_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("MA_FAST", "60")]).is_err());
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).is_err());
    }
}
