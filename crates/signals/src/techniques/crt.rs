use common::models::{Candle, Signal, TechniqueReport};

use crate::indicators;
use crate::techniques::MIN_CANDLES;

const RECENT: usize = 5;
const EXPANSION: f64 = 1.5;

/// Candle-range-theory read: a change of character is a burst of true-range
/// expansion, recent activity running well above the preceding stretch.
/// Direction follows where price travelled across the burst.
pub fn analyze(candles: &[Candle]) -> TechniqueReport {
    if candles.len() < MIN_CANDLES {
        return TechniqueReport::neutral("crt", "not enough data for analysis");
    }

    let n = candles.len();
    let recent = indicators::mean_true_range(candles, RECENT);
    let prior = indicators::mean_true_range(&candles[..n - RECENT], RECENT);

    let expanded = prior > 0.0 && recent > prior * EXPANSION;
    let current = candles[n - 1].close;
    let reference = candles[n - 1 - RECENT].close;

    let (signal, confidence, reasoning) = if expanded && current > reference {
        (
            Signal::Buy,
            5,
            "range expansion with price travelling up, bullish change of character",
        )
    } else if expanded && current < reference {
        (
            Signal::Sell,
            5,
            "range expansion with price travelling down, bearish change of character",
        )
    } else {
        (Signal::Neutral, 3, "no change of character in candle ranges")
    };

    TechniqueReport {
        technique: "crt".to_string(),
        signal,
        confidence,
        reasoning: reasoning.to_string(),
        details: vec![
            ("recent_true_range".to_string(), format!("{:.5}", recent)),
            ("prior_true_range".to_string(), format!("{:.5}", prior)),
            (
                "expansion".to_string(),
                if expanded { "yes" } else { "no" }.to_string(),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_burst(drift: f64) -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..55)
            .map(|i| Candle {
                epoch: i as i64 * 900,
                open: 100.0,
                high: 100.5,
                low: 99.5,
                close: 100.0,
            })
            .collect();
        for i in 0..5 {
            let base = 100.0 + drift * (i + 1) as f64;
            candles.push(Candle {
                epoch: (55 + i) as i64 * 900,
                open: base - drift,
                high: base.max(base - drift) + 2.0,
                low: base.min(base - drift) - 2.0,
                close: base,
            });
        }
        candles
    }

    #[test]
    fn upward_burst_is_a_buy() {
        let report = analyze(&with_burst(1.0));
        assert_eq!(report.signal, Signal::Buy);
        assert_eq!(report.confidence, 5);
    }

    #[test]
    fn downward_burst_is_a_sell() {
        let report = analyze(&with_burst(-1.0));
        assert_eq!(report.signal, Signal::Sell);
    }

    #[test]
    fn quiet_market_is_neutral() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| Candle {
                epoch: i as i64 * 900,
                open: 100.0,
                high: 100.5,
                low: 99.5,
                close: 100.0,
            })
            .collect();
        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Neutral);
    }
}
