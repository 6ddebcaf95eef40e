pub mod indicators;
pub mod services;

pub use indicators::{IndicatorEngine, IndicatorError, Indicators};
pub use services::signal_service::SignalGenerator;
