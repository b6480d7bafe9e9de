use common::models::{Candle, Signal, TechniqueReport};

use crate::indicators;
use crate::techniques::MIN_CANDLES;

const SWING_WINDOW: usize = 20;

/// Smart-money-concepts read: a close beyond the prior swing extreme marks
/// an order block in that direction; otherwise price is inside the range.
pub fn analyze(candles: &[Candle]) -> TechniqueReport {
    if candles.len() < MIN_CANDLES {
        return TechniqueReport::neutral("smc", "not enough data for analysis");
    }

    let n = candles.len();
    let current = &candles[n - 1];
    // Swing extremes come from the window ending at the previous candle so
    // the breaking candle never defines its own level.
    let window = &candles[n - 1 - SWING_WINDOW..n - 1];
    let swing_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let swing_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    let (block, signal, confidence, reasoning) = if current.close > swing_high {
        (
            "bullish",
            Signal::Buy,
            6,
            "close above the prior swing high, bullish order block in play",
        )
    } else if current.close < swing_low {
        (
            "bearish",
            Signal::Sell,
            6,
            "close below the prior swing low, bearish order block in play",
        )
    } else {
        (
            "none",
            Signal::Neutral,
            3,
            "price inside the swing range, no order block",
        )
    };

    let mean_range = indicators::mean_range(candles, SWING_WINDOW);
    let fvg = fair_value_gap(candles);

    TechniqueReport {
        technique: "smc".to_string(),
        signal,
        confidence,
        reasoning: reasoning.to_string(),
        details: vec![
            ("order_block".to_string(), block.to_string()),
            ("swing_high".to_string(), format!("{:.5}", swing_high)),
            ("swing_low".to_string(), format!("{:.5}", swing_low)),
            ("mean_range".to_string(), format!("{:.5}", mean_range)),
            ("fair_value_gap".to_string(), fvg.to_string()),
        ],
    }
}

/// A three-candle fair value gap: the last candle's low above the
/// third-to-last candle's high (bullish) or the mirror (bearish).
fn fair_value_gap(candles: &[Candle]) -> &'static str {
    let n = candles.len();
    if n < 3 {
        return "none";
    }
    let first = &candles[n - 3];
    let last = &candles[n - 1];
    if last.low > first.high {
        "bullish"
    } else if last.high < first.low {
        "bearish"
    } else {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranging(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let wiggle = if i % 2 == 0 { 0.4 } else { -0.4 };
                Candle {
                    epoch: i as i64 * 900,
                    open: 100.0,
                    high: 101.0 + wiggle,
                    low: 99.0 + wiggle,
                    close: 100.0 + wiggle,
                }
            })
            .collect()
    }

    #[test]
    fn close_above_swing_high_is_a_buy() {
        let mut candles = ranging(60);
        let last = candles.last_mut().unwrap();
        last.close = 104.0;
        last.high = 104.2;
        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Buy);
        assert_eq!(report.confidence, 6);
    }

    #[test]
    fn close_below_swing_low_is_a_sell() {
        let mut candles = ranging(60);
        let last = candles.last_mut().unwrap();
        last.close = 96.0;
        last.low = 95.8;
        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Sell);
    }

    #[test]
    fn inside_the_range_is_neutral() {
        let report = analyze(&ranging(60));
        assert_eq!(report.signal, Signal::Neutral);
        assert_eq!(report.confidence, 3);
    }

    #[test]
    fn gap_up_reports_a_bullish_fvg() {
        let mut candles = ranging(60);
        let n = candles.len();
        candles[n - 1] = Candle {
            epoch: candles[n - 1].epoch,
            open: 103.0,
            high: 104.0,
            low: 102.5,
            close: 103.5,
        };
        let report = analyze(&candles);
        let fvg = report
            .details
            .iter()
            .find(|(k, _)| k == "fair_value_gap")
            .unwrap();
        assert_eq!(fvg.1, "bullish");
    }
}
