use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::config::StrategyConfig;
use common::models::{Notification, Trade};
use market_data::MarketDataSource;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// The day's trades, in the order they were opened.
pub struct TradeLedger {
    trades: Vec<Trade>,
    quota: usize,
    leverage: f64,
    notification_tx: Option<broadcast::Sender<Notification>>,
}

impl TradeLedger {
    pub fn new(quota: usize, leverage: f64) -> Self {
        Self {
            trades: Vec::new(),
            quota,
            leverage,
            notification_tx: None,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.daily_quota, config.leverage)
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.notification_tx = Some(tx);
        self
    }

    /// Replaces the contents with a ledger loaded from storage.
    pub fn restore(&mut self, trades: Vec<Trade>) {
        self.trades = trades;
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn remaining_quota(&self) -> usize {
        self.quota.saturating_sub(self.trades.len())
    }

    /// Pairs that already have a trade today, open or closed.
    pub fn pairs(&self) -> HashSet<String> {
        self.trades.iter().map(|t| t.pair.clone()).collect()
    }

    /// Appends new signals up to the remaining quota and announces each one.
    /// Returns how many were accepted.
    pub fn open(&mut self, trades: Vec<Trade>) -> usize {
        let room = self.remaining_quota();
        if trades.len() > room {
            warn!(
                "Dropping {} signals over the daily quota of {}",
                trades.len() - room,
                self.quota
            );
        }

        let accepted: Vec<Trade> = trades.into_iter().take(room).collect();
        for trade in &accepted {
            self.notify(Notification::TradeOpened(trade.clone()));
        }

        let count = accepted.len();
        self.trades.extend(accepted);
        count
    }

    /// Evaluates every open trade against its current price and closes the
    /// ones that crossed a threshold. Trades whose price can't be fetched are
    /// left as they are. Returns the trades closed by this call.
    pub async fn check(&mut self, source: &dyn MarketDataSource, now: DateTime<Utc>) -> Vec<Trade> {
        let mut closed = Vec::new();

        for trade in self.trades.iter_mut().filter(|t| t.is_open()) {
            let price = match source.last_price(&trade.pair).await {
                Ok(price) if price.is_finite() => price,
                Ok(price) => {
                    warn!("Ignoring non-finite price {} for {}", price, trade.pair);
                    continue;
                }
                Err(e) => {
                    warn!("Price lookup failed for {}: {}", trade.pair, e);
                    continue;
                }
            };

            let Some(status) = trade.evaluate(price) else {
                debug!("{} still open at {}", trade.pair, price);
                continue;
            };

            if let Some(pnl) = trade.close(status, self.leverage, now) {
                info!(
                    "{} {} closed as {} ({:+.2}%)",
                    trade.direction, trade.pair, status, pnl
                );
                closed.push((trade.clone(), price));
            }
        }

        // Notify after the mutable borrow of the trades is released.
        closed
            .into_iter()
            .map(|(trade, price)| {
                self.notify(Notification::TradeClosed {
                    trade: trade.clone(),
                    price,
                });
                trade
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    fn notify(&self, event: Notification) {
        if let Some(ref tx) = self.notification_tx {
            let _ = tx.send(event);
        }
    }
}
