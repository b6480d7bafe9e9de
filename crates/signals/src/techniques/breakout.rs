use common::models::{Candle, Signal, TechniqueReport};

use crate::indicators;

const LOOKBACK: usize = 20;
/// Relative distance to a broken level that still counts as a retest.
const RETEST_TOLERANCE: f64 = 0.002;
/// Candles scanned backwards for an already-completed retest.
const RETEST_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetestStatus {
    NoBreakout,
    NoRetest,
    RetestingLevel,
    RetestCompleted,
}

impl RetestStatus {
    fn label(&self) -> &'static str {
        match self {
            RetestStatus::NoBreakout => "no_breakout",
            RetestStatus::NoRetest => "no_retest",
            RetestStatus::RetestingLevel => "retesting_level",
            RetestStatus::RetestCompleted => "retest_completed",
        }
    }
}

/// Breakout & retest detection over the last `LOOKBACK` candles.
///
/// The reference levels are the rolling high/low as of the previous candle,
/// so the breakout is the move of the current close through a level the
/// previous close had not yet crossed.
pub fn analyze(candles: &[Candle]) -> TechniqueReport {
    if candles.len() < LOOKBACK + 10 {
        return TechniqueReport::neutral("breakout_retest", "not enough data for analysis");
    }

    let n = candles.len();
    let window = &candles[n - 1 - LOOKBACK..n - 1];
    let resistance = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let support = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    let current = candles[n - 1].close;
    let prev_close = candles[n - 2].close;

    let (direction, strength) = if prev_close <= resistance && current > resistance {
        (
            Some(Direction::Bullish),
            (current - resistance) / resistance * 100.0,
        )
    } else if prev_close >= support && current < support {
        (
            Some(Direction::Bearish),
            (support - current) / support * 100.0,
        )
    } else {
        (None, 0.0)
    };

    let retest = check_retest(candles, resistance, support, direction);

    let closes = indicators::closes(candles);
    let rsi = indicators::rsi(&closes, 14);
    let macd_hist = indicators::macd_histogram(&closes);

    // Deriv publishes no volume; an expanding candle range stands in for
    // volume confirmation.
    let range_confirmation =
        indicators::mean_range(candles, 10) > indicators::mean_range(candles, LOOKBACK) * 1.2;

    let (signal, confidence, reasoning) =
        grade(direction, retest, strength, rsi, macd_hist, range_confirmation);

    TechniqueReport {
        technique: "breakout_retest".to_string(),
        signal,
        confidence,
        reasoning: reasoning.to_string(),
        details: vec![
            ("resistance_level".to_string(), format!("{:.5}", resistance)),
            ("support_level".to_string(), format!("{:.5}", support)),
            ("breakout_strength".to_string(), format!("{:.2}%", strength)),
            ("retest_status".to_string(), retest.label().to_string()),
            ("rsi".to_string(), format!("{:.2}", rsi)),
            ("macd_histogram".to_string(), format!("{:.5}", macd_hist)),
            (
                "range_confirmation".to_string(),
                range_confirmation.to_string(),
            ),
        ],
    }
}

fn check_retest(
    candles: &[Candle],
    resistance: f64,
    support: f64,
    direction: Option<Direction>,
) -> RetestStatus {
    let Some(direction) = direction else {
        return RetestStatus::NoBreakout;
    };
    let level = match direction {
        Direction::Bullish => resistance,
        Direction::Bearish => support,
    };

    let n = candles.len();
    let current = candles[n - 1].close;
    if (current - level).abs() / level < RETEST_TOLERANCE {
        return RetestStatus::RetestingLevel;
    }

    for i in 0..RETEST_WINDOW.min(n - 1) {
        let close = candles[n - 2 - i].close;
        if (close - level).abs() / level < RETEST_TOLERANCE {
            return RetestStatus::RetestCompleted;
        }
    }
    RetestStatus::NoRetest
}

fn grade(
    direction: Option<Direction>,
    retest: RetestStatus,
    strength: f64,
    rsi: f64,
    macd_hist: f64,
    range_conf: bool,
) -> (Signal, u8, &'static str) {
    let Some(direction) = direction else {
        return (Signal::Neutral, 0, "no breakout detected");
    };

    match direction {
        Direction::Bullish => {
            let momentum_ok = rsi < 70.0 && macd_hist > 0.0;
            match retest {
                RetestStatus::RetestingLevel if momentum_ok && range_conf => (
                    Signal::Buy,
                    9,
                    "strong bullish breakout with retest at resistance",
                ),
                RetestStatus::RetestingLevel => {
                    (Signal::Buy, 7, "bullish breakout with retest opportunity")
                }
                RetestStatus::RetestCompleted if momentum_ok => {
                    (Signal::Buy, 8, "bullish breakout confirmed after retest")
                }
                RetestStatus::RetestCompleted => {
                    (Signal::Buy, 6, "bullish breakout, retest completed")
                }
                _ if strength > 1.0 && rsi < 70.0 && range_conf => {
                    (Signal::Buy, 8, "strong bullish breakout detected")
                }
                _ => (Signal::Buy, 5, "bullish breakout detected"),
            }
        }
        Direction::Bearish => {
            let momentum_ok = rsi > 30.0 && macd_hist < 0.0;
            match retest {
                RetestStatus::RetestingLevel if momentum_ok && range_conf => (
                    Signal::Sell,
                    9,
                    "strong bearish breakout with retest at support",
                ),
                RetestStatus::RetestingLevel => {
                    (Signal::Sell, 7, "bearish breakout with retest opportunity")
                }
                RetestStatus::RetestCompleted if momentum_ok => {
                    (Signal::Sell, 8, "bearish breakout confirmed after retest")
                }
                RetestStatus::RetestCompleted => {
                    (Signal::Sell, 6, "bearish breakout, retest completed")
                }
                _ if strength > 1.0 && rsi > 30.0 && range_conf => {
                    (Signal::Sell, 8, "strong bearish breakout detected")
                }
                _ => (Signal::Sell, 5, "bearish breakout detected"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranging(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let wiggle = if i % 2 == 0 { 0.3 } else { -0.3 };
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
    fn too_short_is_neutral() {
        let report = analyze(&ranging(20));
        assert_eq!(report.signal, Signal::Neutral);
        assert_eq!(report.confidence, 0);
    }

    #[test]
    fn range_bound_market_is_neutral() {
        let report = analyze(&ranging(60));
        assert_eq!(report.signal, Signal::Neutral);
        assert_eq!(report.reasoning, "no breakout detected");
    }

    #[test]
    fn close_through_resistance_is_a_buy() {
        let mut candles = ranging(60);
        // Current close clears the prior 20-candle high while the previous
        // close was still inside the range.
        let last = candles.last_mut().unwrap();
        last.close = 103.5;
        last.high = 103.8;

        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Buy);
        assert!(report.confidence >= 5);
        let retest = report
            .details
            .iter()
            .find(|(k, _)| k == "retest_status")
            .unwrap();
        assert_ne!(retest.1, "no_breakout");
    }

    #[test]
    fn close_just_past_resistance_counts_as_retesting() {
        let mut candles = ranging(60);
        // Resistance over the prior window is 101.3; a close 0.1% above it
        // is inside the retest tolerance.
        let last = candles.last_mut().unwrap();
        last.close = 101.4;
        last.high = 101.6;

        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Buy);
        assert!(report.confidence >= 7);
        let retest = report
            .details
            .iter()
            .find(|(k, _)| k == "retest_status")
            .unwrap();
        assert_eq!(retest.1, "retesting_level");
    }

    #[test]
    fn close_through_support_is_a_sell() {
        let mut candles = ranging(60);
        let last = candles.last_mut().unwrap();
        last.close = 96.0;
        last.low = 95.8;

        let report = analyze(&candles);
        assert_eq!(report.signal, Signal::Sell);
        assert!(report.confidence >= 5);
    }
}
