use chrono::NaiveDate;
use common::models::{DailyReport, Notification, Trade, TradeStatus};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::trade_ledger::TradeLedger;

/// Builds the end-of-day report and resets the ledger.
#[derive(Default)]
pub struct SummaryAggregator {
    notification_tx: Option<broadcast::Sender<Notification>>,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.notification_tx = Some(tx);
        self
    }

    /// Counts and sums closed trades; open trades are listed but never
    /// contribute to the PnL total.
    pub fn aggregate(date: NaiveDate, trades: &[Trade]) -> DailyReport {
        let mut report = DailyReport {
            date,
            closed: Vec::new(),
            still_open: Vec::new(),
            tp_count: 0,
            sl_count: 0,
            total_pnl: 0.0,
        };

        for trade in trades {
            match trade.status {
                TradeStatus::TakeProfit => report.tp_count += 1,
                TradeStatus::StopLoss => report.sl_count += 1,
                TradeStatus::Open => {
                    report.still_open.push(trade.pair.clone());
                    continue;
                }
            }
            report.total_pnl += trade.pnl.unwrap_or_default();
            report.closed.push(trade.clone());
        }

        report
    }

    /// Reports on the ledger and clears it. Open trades are dropped with the
    /// rest rather than rolled into the next day.
    pub fn run(&self, ledger: &mut TradeLedger, date: NaiveDate) -> DailyReport {
        let report = Self::aggregate(date, ledger.trades());

        if report.is_empty() {
            info!("Daily summary for {}: no trades", date);
        } else {
            info!(
                "Daily summary for {}: {} TP, {} SL, total {:+.2}%",
                date, report.tp_count, report.sl_count, report.total_pnl
            );
        }

        if !report.still_open.is_empty() {
            warn!(
                "Discarding {} open trades at rollover: {}",
                report.still_open.len(),
                report.still_open.join(", ")
            );
        }

        if let Some(ref tx) = self.notification_tx {
            let _ = tx.send(Notification::DailySummary(report.clone()));
        }

        ledger.clear();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::Direction;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn closed(pair: &str, status: TradeStatus) -> Trade {
        let mut trade = Trade::open(pair, Direction::Long, 100.0, 0.007, 0.007, Utc::now());
        trade.close(status, 20.0, Utc::now());
        trade
    }

    #[test]
    fn total_counts_only_closed_trades() {
        let trades = vec![
            closed("AUSDT", TradeStatus::TakeProfit),
            closed("BUSDT", TradeStatus::StopLoss),
            closed("CUSDT", TradeStatus::TakeProfit),
            Trade::open("DUSDT", Direction::Short, 5.0, 0.007, 0.007, Utc::now()),
        ];

        let report = SummaryAggregator::aggregate(date(), &trades);

        assert_eq!(report.tp_count, 2);
        assert_eq!(report.sl_count, 1);
        assert_eq!(report.closed.len(), 3);
        assert_eq!(report.still_open, vec!["DUSDT".to_string()]);

        let expected: f64 = trades.iter().filter_map(|t| t.pnl).sum();
        assert!((report.total_pnl - expected).abs() < 1e-9);
        assert!((report.total_pnl - 14.0).abs() < 1e-9);
    }

    #[test]
    fn empty_ledger_reports_no_trades() {
        let (tx, mut rx) = broadcast::channel(4);
        let aggregator = SummaryAggregator::new().with_notifier(tx);
        let mut ledger = TradeLedger::new(4, 20.0);

        let report = aggregator.run(&mut ledger, date());

        assert!(report.is_empty());
        assert!(ledger.is_empty());
        match rx.try_recv().unwrap() {
            Notification::DailySummary(sent) => {
                assert!(sent.to_string().contains("no trades"));
            }
            other => panic!("unexpected notification {other:?}"),
        }
    }

    #[test]
    fn open_trades_are_discarded_at_rollover() {
        let aggregator = SummaryAggregator::new();
        let mut ledger = TradeLedger::new(4, 20.0);
        ledger.restore(vec![Trade::open(
            "BTCUSDT",
            Direction::Long,
            100.0,
            0.007,
            0.007,
            Utc::now(),
        )]);

        let report = aggregator.run(&mut ledger, date());

        assert_eq!(report.still_open, vec!["BTCUSDT".to_string()]);
        assert_eq!(report.total_pnl, 0.0);
        assert!(ledger.is_empty());
        assert_eq!(ledger.remaining_quota(), 4);
    }

    #[test]
    fn report_text_lists_every_trade() {
        let trades = vec![
            closed("AUSDT", TradeStatus::TakeProfit),
            closed("BUSDT", TradeStatus::StopLoss),
            Trade::open("CUSDT", Direction::Long, 1.0, 0.007, 0.007, Utc::now()),
        ];

        let text = SummaryAggregator::aggregate(date(), &trades).to_string();

        assert!(text.contains("TP AUSDT +14.00%"));
        assert!(text.contains("SL BUSDT -14.00%"));
        assert!(text.contains("OPEN CUSDT"));
        assert!(text.contains("TP hits: 1 | SL hits: 1"));
        assert!(text.contains("Total PnL: "));
    }
}
