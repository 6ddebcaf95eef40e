use async_trait::async_trait;
use common::models::Trade;
use tracing::warn;

pub mod error;
pub mod json_store;
pub mod sqlite_store;

pub use error::StoreError;
pub use json_store::JsonFileStore;
pub use sqlite_store::SqliteTradeStore;

/// Durable home of the ordered trade ledger. `save` replaces the whole ledger;
/// a failed save leaves the previous one intact.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Trade>, StoreError>;

    async fn save(&self, trades: &[Trade]) -> Result<(), StoreError>;
}

fn check(trade: &Trade) -> Result<(), StoreError> {
    if !trade.has_valid_levels() {
        return Err(StoreError::InvalidLevels {
            id: trade.id,
            pair: trade.pair.clone(),
        });
    }
    if !trade.has_consistent_outcome() {
        return Err(StoreError::InconsistentOutcome {
            id: trade.id,
            pair: trade.pair.clone(),
            status: trade.status.to_string(),
            pnl: trade.pnl,
        });
    }
    Ok(())
}

/// Drops stored trades that could not have been produced by the bot, one at a
/// time, so the rest of the ledger keeps trading.
pub(crate) fn validate(trades: Vec<Trade>) -> Vec<Trade> {
    trades
        .into_iter()
        .filter(|trade| match check(trade) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping invalid ledger entry: {}", e);
                false
            }
        })
        .collect()
}
