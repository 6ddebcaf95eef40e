pub mod schedule;
pub mod summary;
pub mod trade_ledger;

pub use schedule::SummarySchedule;
pub use summary::SummaryAggregator;
pub use trade_ledger::TradeLedger;
