use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{Direction, Trade, TradeStatus};
use sqlx::Row;
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{StoreError, TradeStore, validate};

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

/// Ledger kept in a SQLite table, replaced wholesale inside one transaction.
pub struct SqliteTradeStore {
    pool: SqlitePool,
}

impl SqliteTradeStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Ledger database ready at {}", database_url);

        Ok(Self { pool })
    }
}

fn decode<T: FromStr>(column: &'static str, value: String) -> Result<T, StoreError> {
    value
        .parse::<T>()
        .map_err(|_| StoreError::Decode { column, value })
}

fn trade_from_row(row: &SqliteRow) -> Result<Trade, StoreError> {
    Ok(Trade {
        id: decode::<Uuid>("id", row.try_get("id")?)?,
        pair: row.try_get("pair")?,
        direction: decode::<Direction>("direction", row.try_get("direction")?)?,
        entry: row.try_get("entry")?,
        take_profit: row.try_get("take_profit")?,
        stop_loss: row.try_get("stop_loss")?,
        status: decode::<TradeStatus>("status", row.try_get("status")?)?,
        pnl: row.try_get("pnl")?,
        opened_at: row.try_get::<DateTime<Utc>, _>("opened_at")?,
        closed_at: row.try_get::<Option<DateTime<Utc>>, _>("closed_at")?,
    })
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn load(&self) -> Result<Vec<Trade>, StoreError> {
        let rows = sqlx::query(
            r#"
                SELECT id, pair, direction, entry, take_profit, stop_loss,
                       status, pnl, opened_at, closed_at
                FROM trades
                ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let trades = rows
            .iter()
            .map(trade_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(validate(trades))
    }

    async fn save(&self, trades: &[Trade]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM trades").execute(&mut *tx).await?;

        for (position, trade) in trades.iter().enumerate() {
            sqlx::query(
                r#"
                    INSERT INTO trades (
                        position, id, pair, direction, entry, take_profit, stop_loss,
                        status, pnl, opened_at, closed_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(position as i64)
            .bind(trade.id.to_string())
            .bind(&trade.pair)
            .bind(trade.direction.to_string())
            .bind(trade.entry)
            .bind(trade.take_profit)
            .bind(trade.stop_loss)
            .bind(trade.status.to_string())
            .bind(trade.pnl)
            .bind(trade.opened_at)
            .bind(trade.closed_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Saved {} trades to database", trades.len());
        Ok(())
    }
}
