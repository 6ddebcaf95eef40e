use std::collections::HashSet;

use chrono::Utc;
use common::config::StrategyConfig;
use common::models::{Direction, Trade};
use market_data::{MarketDataError, MarketDataSource};
use tracing::{debug, info, warn};

use crate::indicators::{IndicatorEngine, Indicators};

/// Scans ranked markets and turns breakouts into paper trades.
pub struct SignalGenerator {
    engine: IndicatorEngine,
    config: StrategyConfig,
}

impl SignalGenerator {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            engine: IndicatorEngine::from_config(&config),
            config,
        }
    }

    /// Breakout rule: price above a rising MA stack with RSI above the long
    /// threshold goes long, the mirror image goes short.
    pub fn breakout_direction(&self, snapshot: &Indicators) -> Option<Direction> {
        let Indicators {
            last_close,
            ma_fast,
            ma_slow,
            rsi,
        } = *snapshot;

        if last_close > ma_fast && ma_fast > ma_slow && rsi > self.config.rsi_long {
            Some(Direction::Long)
        } else if last_close < ma_fast && ma_fast < ma_slow && rsi < self.config.rsi_short {
            Some(Direction::Short)
        } else {
            None
        }
    }

    /// Markets by 24h quote volume, highest first, cut to the universe size.
    pub async fn rank_markets(
        &self,
        source: &dyn MarketDataSource,
    ) -> Result<Vec<String>, MarketDataError> {
        let markets: HashSet<String> = source.list_markets().await?.into_iter().collect();
        let mut volumes: Vec<_> = source
            .quote_volumes()
            .await?
            .into_iter()
            .filter(|v| markets.contains(&v.pair))
            .collect();

        // Stable sort keeps the source order on ties.
        volumes.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume));

        Ok(volumes
            .into_iter()
            .take(self.config.universe_size)
            .map(|v| v.pair)
            .collect())
    }

    /// One generation pass. Yields at most `quota` trades and stops fetching
    /// as soon as the quota is met. Markets in `exclude` and markets whose
    /// data can't be fetched are skipped.
    pub async fn generate(
        &self,
        source: &dyn MarketDataSource,
        quota: usize,
        exclude: &HashSet<String>,
    ) -> Vec<Trade> {
        let mut signals = Vec::new();
        if quota == 0 {
            return signals;
        }

        let ranked = match self.rank_markets(source).await {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!("Market ranking failed, skipping generation pass: {}", e);
                return signals;
            }
        };

        for pair in ranked.iter().filter(|p| !exclude.contains(*p)) {
            let candles = match source
                .fetch_candles(pair, &self.config.candle_interval, self.config.candle_limit)
                .await
            {
                Ok(candles) => candles,
                Err(e) => {
                    warn!("Skipping {}: candle fetch failed: {}", pair, e);
                    continue;
                }
            };

            let snapshot = match self.engine.compute(&candles) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!("Skipping {}: {}", pair, e);
                    continue;
                }
            };

            debug!(
                "{}: close={} ma{}={:.6} ma{}={:.6} rsi={:.2}",
                pair,
                snapshot.last_close,
                self.config.ma_fast,
                snapshot.ma_fast,
                self.config.ma_slow,
                snapshot.ma_slow,
                snapshot.rsi
            );

            let Some(direction) = self.breakout_direction(&snapshot) else {
                continue;
            };

            let trade = Trade::open(
                pair.as_str(),
                direction,
                snapshot.last_close,
                self.config.take_profit_pct,
                self.config.stop_loss_pct,
                Utc::now(),
            );
            info!(
                "Signal: {} {} entry={} tp={} sl={} (rsi {:.1})",
                direction, pair, trade.entry, trade.take_profit, trade.stop_loss, snapshot.rsi
            );
            signals.push(trade);

            if signals.len() >= quota {
                break;
            }
        }

        signals
    }
}
