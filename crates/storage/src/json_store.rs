use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::models::Trade;
use tokio::fs;
use tracing::{debug, info};

use crate::{StoreError, TradeStore, validate};

/// Ledger kept as a JSON array in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TradeStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Trade>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No ledger at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let trades: Vec<Trade> = serde_json::from_str(&raw)?;
        Ok(validate(trades))
    }

    async fn save(&self, trades: &[Trade]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(trades)?;
        let temp = self.temp_path();

        // Write-then-rename so readers never observe a partial ledger.
        fs::write(&temp, json)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!("Saved {} trades to {}", trades.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::{Direction, TradeStatus};

    #[tokio::test]
    async fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("trades.json"));

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_ledger_keeps_order_and_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state").join("trades.json"));

        let mut first = Trade::open("BTCUSDT", Direction::Long, 100.0, 0.007, 0.007, Utc::now());
        first.close(TradeStatus::TakeProfit, 20.0, Utc::now());
        let second = Trade::open("ETHUSDT", Direction::Short, 50.0, 0.007, 0.007, Utc::now());

        store.save(&[first.clone(), second.clone()]).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, vec![first, second]);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn reads_files_from_the_previous_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        std::fs::write(
            &path,
            r#"[{"pair": "BTC/USDT", "direction": "LONG", "entry": 100.0, "tp": 100.7,
                 "sl": 99.3, "status": "OPEN"}]"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new(&path).load().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].pair, "BTCUSDT");
        assert!(loaded[0].is_open());
        assert_eq!(loaded[0].pnl, None);
    }

    #[tokio::test]
    async fn truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        std::fs::write(&path, r#"[{"pair": "BTCUSDT", "direction": "LO"#).unwrap();

        let result = JsonFileStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn invalid_trades_are_dropped_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        // Levels rounded onto the entry, inverted levels, and a close with no pnl.
        std::fs::write(
            &path,
            r#"[{"pair": "DOGE/USDT", "direction": "LONG", "entry": 0.12, "tp": 0.12,
                 "sl": 0.12, "status": "OPEN"},
                {"pair": "BTC/USDT", "direction": "LONG", "entry": 100.0, "tp": 100.7,
                 "sl": 99.3, "status": "OPEN"},
                {"pair": "ETH/USDT", "direction": "LONG", "entry": 100.0, "tp": 99.0,
                 "sl": 101.0, "status": "OPEN"},
                {"pair": "SOL/USDT", "direction": "LONG", "entry": 100.0, "tp": 100.7,
                 "sl": 99.3, "status": "TP"}]"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new(&path).load().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].pair, "BTCUSDT");
    }
}
