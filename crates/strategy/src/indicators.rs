use common::config::StrategyConfig;
use common::models::Candle;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use thiserror::Error;

/// Substitute for an average gain or loss of exactly zero.
pub const RSI_FLOOR: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("need at least {needed} candles, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("window contains a non-finite close")]
    NonFiniteClose,
    #[error("invalid indicator period: {0}")]
    InvalidPeriod(usize),
}

/// Indicator snapshot of one market at the latest candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub last_close: f64,
    /// Simple mean of the last `ma_fast` closes (historically called EMA20).
    pub ma_fast: f64,
    /// Simple mean of the last `ma_slow` closes (historically called EMA50).
    pub ma_slow: f64,
    pub rsi: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    ma_fast: usize,
    ma_slow: usize,
    rsi_period: usize,
}

impl IndicatorEngine {
    pub fn new(ma_fast: usize, ma_slow: usize, rsi_period: usize) -> Self {
        Self {
            ma_fast,
            ma_slow,
            rsi_period,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.ma_fast, config.ma_slow, config.rsi_period)
    }

    /// Shortest candle window `compute` accepts.
    pub fn required_candles(&self) -> usize {
        self.ma_fast.max(self.ma_slow).max(self.rsi_period)
    }

    /// Computes the snapshot from `candles` (oldest first). Refuses short
    /// windows instead of averaging over fewer closes.
    pub fn compute(&self, candles: &[Candle]) -> Result<Indicators, IndicatorError> {
        let needed = self.required_candles();
        if candles.len() < needed {
            return Err(IndicatorError::InsufficientData {
                needed,
                got: candles.len(),
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(IndicatorError::NonFiniteClose);
        }

        let Some(&last_close) = closes.last() else {
            return Err(IndicatorError::InsufficientData { needed, got: 0 });
        };

        Ok(Indicators {
            last_close,
            ma_fast: simple_mean(&closes, self.ma_fast)?,
            ma_slow: simple_mean(&closes, self.ma_slow)?,
            rsi: relative_strength(&closes, self.rsi_period)?,
        })
    }
}

/// Arithmetic mean of the last `period` closes.
fn simple_mean(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 || closes.len() < period {
        return Err(IndicatorError::InvalidPeriod(period));
    }

    let mut sma =
        SimpleMovingAverage::new(period).map_err(|_| IndicatorError::InvalidPeriod(period))?;

    let mut mean = 0.0;
    for &close in &closes[closes.len() - period..] {
        mean = sma.next(close);
    }
    Ok(mean)
}

/// RSI over the last `period` closes. Gains and losses are averaged over
/// `period`; an empty side falls back to `RSI_FLOOR`.
pub fn relative_strength(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 || closes.len() < period {
        return Err(IndicatorError::InvalidPeriod(period));
    }

    let window = &closes[closes.len() - period..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = if gains > 0.0 {
        gains / period as f64
    } else {
        RSI_FLOOR
    };
    let avg_loss = if losses > 0.0 {
        losses / period as f64
    } else {
        RSI_FLOOR
    };

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::from_close(i as i64 * 900_000, c))
            .collect()
    }

    #[test]
    fn moving_averages_are_simple_means() {
        let closes: Vec<f64> = (1..=50).map(f64::from).collect();
        let engine = IndicatorEngine::new(20, 50, 14);

        let snapshot = engine.compute(&candles(&closes)).unwrap();

        assert_eq!(snapshot.last_close, 50.0);
        // mean(31..=50) and mean(1..=50)
        assert!((snapshot.ma_fast - 40.5).abs() < 1e-9);
        assert!((snapshot.ma_slow - 25.5).abs() < 1e-9);
    }

    #[test]
    fn only_the_latest_window_counts() {
        let mut closes = vec![1_000.0; 10];
        closes.extend(std::iter::repeat_n(10.0, 50));
        let engine = IndicatorEngine::new(20, 50, 14);

        let snapshot = engine.compute(&candles(&closes)).unwrap();

        assert!((snapshot.ma_slow - 10.0).abs() < 1e-9);
    }

    #[test]
    fn refuses_short_windows() {
        let engine = IndicatorEngine::new(20, 50, 14);
        let result = engine.compute(&candles(&[1.0; 49]));

        assert_eq!(
            result,
            Err(IndicatorError::InsufficientData { needed: 50, got: 49 })
        );
    }

    #[test]
    fn rejects_nan_closes() {
        let mut closes = vec![10.0; 50];
        closes[30] = f64::NAN;
        let engine = IndicatorEngine::new(20, 50, 14);

        assert_eq!(
            engine.compute(&candles(&closes)),
            Err(IndicatorError::NonFiniteClose)
        );
    }

    #[test]
    fn flat_window_uses_floor_on_both_sides() {
        let rsi = relative_strength(&[5.0; 14], 14).unwrap();
        assert!((rsi - 50.0).abs() < 1e-9);
    }

    #[test]
    fn steady_rally_without_losses() {
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let rsi = relative_strength(&closes, 14).unwrap();

        // avg gain 13/14 against the 0.01 floor
        let expected = 100.0 - 100.0 / (1.0 + (13.0 / 14.0) / RSI_FLOOR);
        assert!((rsi - expected).abs() < 1e-9);
        assert!(rsi > 98.0);
    }

    #[test]
    fn balanced_moves_give_midpoint() {
        let closes = [
            10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0,
        ];
        let rsi = relative_strength(&closes, 14).unwrap();

        // 7 gains of 1 vs 6 losses of 1
        let expected = 100.0 - 100.0 / (1.0 + 7.0 / 6.0);
        assert!((rsi - expected).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn rsi_stays_within_bounds(closes in prop::collection::vec(1e-8f64..1e6, 14..60)) {
            let rsi = relative_strength(&closes, 14).unwrap();
            prop_assert!(rsi.is_finite());
            prop_assert!((0.0..=100.0).contains(&rsi));
        }
    }
}
