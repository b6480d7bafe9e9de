use ta::indicators::{
    AverageTrueRange, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
};
use ta::{DataItem, Next};

use common::models::Candle;

/// Fallback when a window is too short to compute anything meaningful.
/// Matches the floor the risk calculations expect.
pub const MIN_ATR: f64 = 0.0001;

/// Latest RSI value over the full close series. 50.0 (neutral) when the
/// series is shorter than the period.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() <= period {
        return 50.0;
    }
    let mut indicator = RelativeStrengthIndex::new(period).unwrap();
    closes.iter().fold(50.0, |_, &c| indicator.next(c))
}

/// Latest MACD(12, 26, 9) histogram value.
pub fn macd_histogram(closes: &[f64]) -> f64 {
    if closes.len() < 26 {
        return 0.0;
    }
    let mut indicator = MovingAverageConvergenceDivergence::new(12, 26, 9).unwrap();
    let mut histogram = 0.0;
    for &close in closes {
        histogram = indicator.next(close).histogram;
    }
    histogram
}

/// Latest ATR over the candle series.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if candles.len() <= period {
        return MIN_ATR;
    }
    let mut indicator = AverageTrueRange::new(period).unwrap();
    let mut value = MIN_ATR;
    for candle in candles {
        let item = DataItem::builder()
            .open(candle.open)
            .high(candle.high)
            .low(candle.low)
            .close(candle.close)
            .volume(0.0)
            .build();
        match item {
            Ok(item) => value = indicator.next(&item),
            // Malformed candle (e.g. high < low); skip rather than poison the series.
            Err(_) => continue,
        }
    }
    value.max(MIN_ATR)
}

/// Mean high-low range over the last `n` candles.
pub fn mean_range(candles: &[Candle], n: usize) -> f64 {
    let tail = last_n(candles, n);
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().map(Candle::range).sum::<f64>() / tail.len() as f64
}

/// Mean true range over the last `n` candles, using each candle's
/// predecessor for the gap component.
pub fn mean_true_range(candles: &[Candle], n: usize) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }
    let start = candles.len().saturating_sub(n).max(1);
    let window = &candles[start..];
    if window.is_empty() {
        return 0.0;
    }
    let sum: f64 = window
        .iter()
        .enumerate()
        .map(|(i, c)| c.true_range(candles[start + i - 1].close))
        .sum();
    sum / window.len() as f64
}

pub fn last_n(candles: &[Candle], n: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(n)..]
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(n: usize, price: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                epoch: i as i64 * 900,
                open: price,
                high: price + 1.0,
                low: price - 1.0,
                close: price,
            })
            .collect()
    }

    #[test]
    fn short_series_fall_back() {
        assert_eq!(rsi(&[100.0, 101.0], 14), 50.0);
        assert_eq!(macd_histogram(&[100.0; 10]), 0.0);
        assert_eq!(atr(&flat_candles(5, 100.0), 14), MIN_ATR);
    }

    #[test]
    fn rsi_tracks_direction() {
        let rising: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let falling: Vec<f64> = (0..60).map(|i| 160.0 - i as f64).collect();
        assert!(rsi(&rising, 14) > 70.0);
        assert!(rsi(&falling, 14) < 30.0);
    }

    #[test]
    fn atr_reflects_candle_range() {
        let candles = flat_candles(60, 100.0);
        let value = atr(&candles, 14);
        // Every candle spans exactly 2.0 with no gaps.
        assert!((value - 2.0).abs() < 0.2, "atr was {}", value);
    }

    #[test]
    fn mean_range_of_flat_candles() {
        let candles = flat_candles(30, 100.0);
        assert!((mean_range(&candles, 10) - 2.0).abs() < 1e-9);
        assert!((mean_true_range(&candles, 10) - 2.0).abs() < 1e-9);
    }
}
