use common::models::{Candle, Timeframe};

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 32;
const TABLE_ROWS: usize = 5;

/// Monospace chart for a candle series: a close-price sparkline over the
/// tail of the series and an OHLC table of the most recent candles.
/// The caller wraps the output in a code block.
pub fn render(symbol: &str, timeframe: Timeframe, candles: &[Candle]) -> String {
    if candles.is_empty() {
        return format!("{} {} - no candle data", symbol, timeframe.label());
    }

    let tail = &candles[candles.len().saturating_sub(SPARK_WIDTH)..];
    let closes: Vec<f64> = tail.iter().map(|c| c.close).collect();
    let high = closes.iter().fold(f64::MIN, |a, &b| a.max(b));
    let low = closes.iter().fold(f64::MAX, |a, &b| a.min(b));

    let mut out = format!(
        "{} · {} · last {} candles\nhigh {:.5}\n",
        symbol,
        timeframe.label(),
        tail.len(),
        high
    );
    out.push_str(&sparkline(&closes, high, low));
    out.push_str(&format!("\nlow  {:.5}\n\n", low));

    out.push_str("      open      high       low     close\n");
    for candle in &tail[tail.len().saturating_sub(TABLE_ROWS)..] {
        let marker = if candle.close >= candle.open { '+' } else { '-' };
        out.push_str(&format!(
            "{} {:9.4} {:9.4} {:9.4} {:9.4}\n",
            marker, candle.open, candle.high, candle.low, candle.close
        ));
    }
    out
}

fn sparkline(closes: &[f64], high: f64, low: f64) -> String {
    let span = high - low;
    closes
        .iter()
        .map(|&close| {
            if span <= f64::EPSILON {
                return SPARK_BLOCKS[0];
            }
            let level = ((close - low) / span * (SPARK_BLOCKS.len() - 1) as f64).round();
            SPARK_BLOCKS[level as usize]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(i: usize, close: f64) -> Candle {
        Candle {
            epoch: i as i64 * 900,
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn sparkline_spans_the_block_range() {
        let candles: Vec<Candle> = (0..10).map(|i| candle(i, 100.0 + i as f64)).collect();
        let chart = render("R_50", Timeframe::M15, &candles);
        assert!(chart.contains('▁'));
        assert!(chart.contains('█'));
        assert!(chart.contains("R_50 · 15m"));
    }

    #[test]
    fn flat_series_renders_without_panicking() {
        let candles: Vec<Candle> = (0..10).map(|i| candle(i, 100.0)).collect();
        let chart = render("R_10", Timeframe::M1, &candles);
        assert!(chart.contains("high 100.00000"));
        assert!(chart.contains("low  100.00000"));
    }

    #[test]
    fn table_shows_only_the_most_recent_candles() {
        let candles: Vec<Candle> = (0..50).map(|i| candle(i, 100.0 + i as f64)).collect();
        let chart = render("R_75", Timeframe::H1, &candles);
        // Only the last five candles appear as table rows.
        assert!(chart.contains("149.0000"));
        assert!(!chart.contains("143.0000"));
    }

    #[test]
    fn empty_series_degrades_to_a_notice() {
        let chart = render("R_25", Timeframe::M5, &[]);
        assert_eq!(chart, "R_25 5m - no candle data");
    }
}
