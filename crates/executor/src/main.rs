use dotenvy::dotenv;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use common::logger;
use common::models::Notification;
use market_data::MarketDataSource;
use market_data::remote::BinanceFuturesClient;
use storage::{JsonFileStore, SqliteTradeStore, TradeStore};

use crate::config::{AppConfig, StoreBackend};
use crate::services::notification_service::NotificationService;
use crate::services::scanner_service::ScannerService;

mod config;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = AppConfig::from_env()?;
    info!(
        "Scanner config: {} signals/day, {}x leverage, top {} markets on {}",
        config.strategy.daily_quota,
        config.strategy.leverage,
        config.strategy.universe_size,
        config.strategy.candle_interval
    );

    let (notify_tx, notify_rx) = broadcast::channel::<Notification>(256);
    let notifier = match &config.telegram {
        Some(telegram) => NotificationService::telegram(telegram),
        None => NotificationService::log_only(),
    };
    let notifier_handle = tokio::spawn(notifier.start(notify_rx));

    let source: Arc<dyn MarketDataSource> =
        Arc::new(BinanceFuturesClient::new(&config.binance_base_url)?);

    let store: Arc<dyn TradeStore> = match &config.store {
        StoreBackend::Json(path) => {
            info!("Keeping the trade ledger in {}", path);
            Arc::new(JsonFileStore::new(path))
        }
        StoreBackend::Sqlite(url) => Arc::new(SqliteTradeStore::connect(url).await?),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    let scanner = ScannerService::new(&config, source, store).with_notifier(notify_tx);
    scanner.run(shutdown_rx).await;

    // The scanner held the last sender; let pending notifications drain.
    let _ = notifier_handle.await;
    Ok(())
}

/// Flips `shutdown` once `signal` fires. If the signal handler can't be
/// installed the sender is held forever so the scanner keeps running.
async fn forward_shutdown(
    signal: impl Future<Output = io::Result<()>>,
    shutdown: watch::Sender<bool>,
) {
    match signal.await {
        Ok(()) => {
            info!("Shutdown requested, finishing current cycle...");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            warn!(
                "Failed to listen for ctrl-c, running without graceful shutdown: {}",
                e
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_flips_shutdown() {
        let (tx, rx) = watch::channel(false);

        forward_shutdown(async { Ok(()) }, tx).await;

        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn failed_signal_handler_keeps_running() {
        let (tx, mut rx) = watch::channel(false);
        tokio::spawn(forward_shutdown(
            async { Err(io::Error::other("no signal support")) },
            tx,
        ));

        let changed = tokio::time::timeout(Duration::from_millis(100), rx.changed()).await;

        assert!(
            changed.is_err(),
            "shutdown channel must stay open and unchanged"
        );
        assert!(!*rx.borrow());
    }
}
