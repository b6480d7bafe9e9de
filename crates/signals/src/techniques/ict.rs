use common::models::{Candle, Signal, TechniqueReport};

use crate::indicators;
use crate::techniques::MIN_CANDLES;

const STRUCTURE_WINDOW: usize = 50;

/// ICT-style market structure read: a market making strictly higher highs
/// and higher lows (or the mirror) over the structure window is trending;
/// anything else is ranging.
pub fn analyze(candles: &[Candle]) -> TechniqueReport {
    if candles.len() < MIN_CANDLES {
        return TechniqueReport::neutral("ict", "not enough data for analysis");
    }

    let tail = indicators::last_n(candles, STRUCTURE_WINDOW);
    let highs_rising = is_monotonic(tail, |c| c.high, true);
    let lows_rising = is_monotonic(tail, |c| c.low, true);
    let highs_falling = is_monotonic(tail, |c| c.high, false);
    let lows_falling = is_monotonic(tail, |c| c.low, false);

    let (structure, signal, confidence, reasoning) = if highs_rising && lows_rising {
        (
            "strong_uptrend",
            Signal::Buy,
            6,
            "higher highs and higher lows across the structure window",
        )
    } else if highs_falling && lows_falling {
        (
            "strong_downtrend",
            Signal::Sell,
            6,
            "lower highs and lower lows across the structure window",
        )
    } else {
        ("ranging", Signal::Neutral, 3, "no clean market structure")
    };

    let highest = tail.iter().map(|c| c.high).fold(f64::MIN, f64::max);

    // Range expansion stands in for volume on synthetic indices: an
    // outsized last candle suggests institutional participation.
    let ranges: Vec<f64> = tail.iter().map(Candle::range).collect();
    let mean = ranges.iter().sum::<f64>() / ranges.len() as f64;
    let variance =
        ranges.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / ranges.len() as f64;
    let order_flow = if ranges.last().copied().unwrap_or(0.0) > mean + variance.sqrt() {
        "institutional"
    } else {
        "retail"
    };

    TechniqueReport {
        technique: "ict".to_string(),
        signal,
        confidence,
        reasoning: reasoning.to_string(),
        details: vec![
            ("market_structure".to_string(), structure.to_string()),
            (
                "liquidity_zones".to_string(),
                format!("above {:.5}", highest),
            ),
            ("order_flow".to_string(), order_flow.to_string()),
        ],
    }
}

fn is_monotonic(candles: &[Candle], f: impl Fn(&Candle) -> f64, rising: bool) -> bool {
    candles.windows(2).all(|w| {
        if rising {
            f(&w[1]) >= f(&w[0])
        } else {
            f(&w[1]) <= f(&w[0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize, step: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                Candle {
                    epoch: i as i64 * 900,
                    open: base,
                    high: base + 0.5,
                    low: base - 0.5,
                    close: base,
                }
            })
            .collect()
    }

    #[test]
    fn uptrend_is_a_buy() {
        let report = analyze(&trending(60, 0.5));
        assert_eq!(report.signal, Signal::Buy);
        assert_eq!(report.confidence, 6);
        let structure = report
            .details
            .iter()
            .find(|(k, _)| k == "market_structure")
            .unwrap();
        assert_eq!(structure.1, "strong_uptrend");
    }

    #[test]
    fn downtrend_is_a_sell() {
        let report = analyze(&trending(60, -0.5));
        assert_eq!(report.signal, Signal::Sell);
    }

    #[test]
    fn choppy_market_is_neutral() {
        let mut candles = trending(60, 0.5);
        candles[55].low = 50.0; // one sweep breaks the structure
        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Neutral);
        assert_eq!(report.confidence, 3);
    }
}
