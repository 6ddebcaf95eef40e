pub mod error;
pub mod remote;
pub mod traits;

pub use error::MarketDataError;
pub use traits::MarketDataSource;

#[cfg(feature = "mocks")]
pub use traits::MockMarketDataSource;
