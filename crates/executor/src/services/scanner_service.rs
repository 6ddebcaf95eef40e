use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use common::models::Notification;
use ledger::{SummaryAggregator, SummarySchedule, TradeLedger};
use market_data::MarketDataSource;
use storage::{StoreError, TradeStore};
use strategy::SignalGenerator;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::time;
use tracing::{error, info};

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("ledger persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// What a single scan cycle did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub closed: usize,
    pub summary: Option<NaiveDate>,
    pub opened: usize,
    pub ledger_size: usize,
}

/// Drives one scan cycle per wake-up: check open trades, roll the day over
/// when due, top the ledger up with new signals, persist after each change.
pub struct ScannerService {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn TradeStore>,
    ledger: TradeLedger,
    generator: SignalGenerator,
    aggregator: SummaryAggregator,
    schedule: SummarySchedule,
    scan_interval: Duration,
}

impl ScannerService {
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn TradeStore>,
    ) -> Self {
        Self {
            source,
            store,
            ledger: TradeLedger::from_config(&config.strategy),
            generator: SignalGenerator::new(config.strategy.clone()),
            aggregator: SummaryAggregator::new(),
            schedule: SummarySchedule::new(config.summary_hour, config.summary_timezone),
            scan_interval: config.scan_interval,
        }
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.ledger = self.ledger.with_notifier(tx.clone());
        self.aggregator = self.aggregator.with_notifier(tx);
        self
    }

    /// One cycle. Market-data failures only skip the markets involved; a
    /// persistence failure aborts the cycle and is returned to the caller.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<CycleReport, ScannerError> {
        let mut report = CycleReport::default();

        self.ledger.restore(self.store.load().await?);

        let closed = self.ledger.check(self.source.as_ref(), now).await;
        report.closed = closed.len();
        if !closed.is_empty() {
            self.store.save(self.ledger.trades()).await?;
        }

        if let Some(date) = self.schedule.due(now) {
            self.aggregator.run(&mut self.ledger, date);
            self.store.save(self.ledger.trades()).await?;
            self.schedule.mark_fired(date);
            report.summary = Some(date);
        }

        let quota = self.ledger.remaining_quota();
        if quota > 0 {
            let signals = self
                .generator
                .generate(self.source.as_ref(), quota, &self.ledger.pairs())
                .await;

            if !signals.is_empty() {
                report.opened = self.ledger.open(signals);
                self.store.save(self.ledger.trades()).await?;
            }
        }

        report.ledger_size = self.ledger.len();
        Ok(report)
    }

    /// Runs cycles until `shutdown` flips to `true` or its sender goes away.
    /// Shutdown is honoured between cycles, never in the middle of one.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting scanner, one cycle every {}s",
            self.scan_interval.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.tick(Utc::now()).await {
                Ok(report) => info!(
                    "Cycle done: {} closed, {} opened, {} in ledger{}",
                    report.closed,
                    report.opened,
                    report.ledger_size,
                    report
                        .summary
                        .map(|d| format!(", summary sent for {}", d))
                        .unwrap_or_default()
                ),
                Err(e) => error!("Scan cycle failed, retrying next cycle: {}", e),
            }

            tokio::select! {
                _ = time::sleep(self.scan_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Scanner stopped.");
    }
}
