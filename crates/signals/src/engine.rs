use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use common::models::{Signal, SignalResult, Timeframe, display_name, symbol};
use market_data::traits::CandleSource;

use crate::advisor::GroqAdvisor;
use crate::techniques::{self, breakout, crt, ict, smc};
use crate::{composite, risk, sessions};

const FETCH_COUNT: u32 = 100;
const CHANGE_WINDOW: usize = 10;

/// One row of the /summary overview.
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    pub symbol: String,
    pub symbol_name: String,
    pub signal: Signal,
    pub confidence: u8,
    pub price: f64,
    pub price_change_pct: f64,
}

/// Orchestrates a full analysis: fetch candles, run the four techniques,
/// combine, attach risk levels and session tags, then let the advisor
/// weigh in when configured.
pub struct SignalEngine {
    source: Arc<dyn CandleSource>,
    advisor: Option<GroqAdvisor>,
}

impl SignalEngine {
    pub fn new(source: Arc<dyn CandleSource>, advisor: Option<GroqAdvisor>) -> Self {
        Self { source, advisor }
    }

    pub async fn analyze(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> anyhow::Result<SignalResult> {
        let symbol_name = display_name(symbol);
        let candles = self
            .source
            .candles(symbol, timeframe, FETCH_COUNT)
            .await?;

        if candles.len() < techniques::MIN_CANDLES {
            warn!(symbol, got = candles.len(), "too few candles, degrading to neutral");
            return Ok(SignalResult::empty(symbol, &symbol_name, timeframe));
        }

        let breakout = breakout::analyze(&candles);
        let ict = ict::analyze(&candles);
        let smc = smc::analyze(&candles);
        let crt = crt::analyze(&candles);
        let composite = composite::combine(&[
            breakout.clone(),
            ict.clone(),
            smc.clone(),
            crt.clone(),
        ]);
        let risk = risk::levels(&candles, composite.signal);

        let current_price = candles[candles.len() - 1].close;
        let reference = candles[candles.len() - 1 - CHANGE_WINDOW.min(candles.len() - 1)].close;
        let price_change = current_price - reference;
        let price_change_pct = if reference != 0.0 {
            price_change / reference * 100.0
        } else {
            0.0
        };

        let now = Utc::now();
        let (kill_zone, in_kill_zone) = sessions::kill_zone(now);

        let mut result = SignalResult {
            symbol: symbol.to_string(),
            symbol_name,
            timeframe,
            current_price,
            price_change,
            price_change_pct,
            composite,
            breakout,
            ict,
            smc,
            crt,
            risk,
            ai: None,
            market_session: sessions::market_session(now).to_string(),
            kill_zone: kill_zone.to_string(),
            in_kill_zone,
            generated_at: now,
        };

        if let Some(advisor) = &self.advisor {
            match advisor.advise(&result).await {
                Ok(adjustment) => result.ai = Some(adjustment),
                // Advisor trouble never blocks the technical result.
                Err(err) => warn!(symbol = %result.symbol, error = %err, "advisor unavailable"),
            }
        }

        info!(
            symbol = %result.symbol,
            signal = %result.final_signal(),
            confidence = result.final_confidence(),
            "analysis complete"
        );
        Ok(result)
    }

    /// Quick signal for each major index; symbols that fail to fetch are
    /// skipped rather than failing the whole overview.
    pub async fn market_summary(&self, timeframe: Timeframe) -> Vec<SummaryEntry> {
        let mut entries = Vec::with_capacity(symbol::MAJOR_INDICES.len());
        for sym in symbol::MAJOR_INDICES {
            match self.analyze(sym, timeframe).await {
                Ok(result) => entries.push(SummaryEntry {
                    symbol: result.symbol.clone(),
                    symbol_name: result.symbol_name.clone(),
                    signal: result.final_signal(),
                    confidence: result.final_confidence(),
                    price: result.current_price,
                    price_change_pct: result.price_change_pct,
                }),
                Err(err) => warn!(symbol = sym, error = %err, "summary fetch failed"),
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Candle;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Source {}

        #[async_trait::async_trait]
        impl CandleSource for Source {
            async fn candles(
                &self,
                symbol: &str,
                timeframe: Timeframe,
                count: u32,
            ) -> anyhow::Result<Vec<Candle>>;
        }
    }

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

    /// A slow steady uptrend that accelerates into a breakout over the last
    /// five candles: trips the breakout, ICT, SMC and CRT analyzers at once.
    fn accelerating_uptrend() -> Vec<Candle> {
        let mut candles = Vec::with_capacity(100);
        let mut close = 100.0;
        for i in 0..100 {
            let step = if i < 95 { 0.1 } else { 1.5 };
            let open = close;
            close = open + step;
            candles.push(Candle {
                epoch: i as i64 * 900,
                open,
                high: close + 0.2,
                low: open - 0.05,
                close,
            });
        }
        candles
    }

    #[tokio::test]
    async fn strong_trend_produces_a_directional_result() {
        let mut source = MockSource::new();
        source
            .expect_candles()
            .with(eq("R_75"), eq(Timeframe::M15), eq(FETCH_COUNT))
            .returning(|_, _, _| Ok(accelerating_uptrend()));

        let engine = SignalEngine::new(Arc::new(source), None);
        let result = engine.analyze("R_75", Timeframe::M15).await.unwrap();

        assert_eq!(result.symbol_name, "Volatility 75 Index");
        assert!(result.final_signal().is_directional());
        assert!(result.final_confidence() <= 10);
        let risk = result.risk.unwrap();
        assert!(risk.atr > 0.0);
        assert!(result.price_change > 0.0);
    }

    #[tokio::test]
    async fn short_history_degrades_to_an_empty_result() {
        let mut source = MockSource::new();
        source
            .expect_candles()
            .returning(|_, _, _| Ok(trending(10, 0.1)));

        let engine = SignalEngine::new(Arc::new(source), None);
        let result = engine.analyze("R_10", Timeframe::M5).await.unwrap();

        assert_eq!(result.final_signal(), Signal::Neutral);
        assert!(result.risk.is_none());
        assert_eq!(result.current_price, 0.0);
    }

    #[tokio::test]
    async fn summary_skips_failing_symbols() {
        let mut source = MockSource::new();
        source.expect_candles().returning(|symbol, _, _| {
            if symbol == "R_50" {
                anyhow::bail!("socket closed")
            }
            Ok(trending(100, 0.2))
        });

        let engine = SignalEngine::new(Arc::new(source), None);
        let entries = engine.market_summary(Timeframe::M15).await;

        assert_eq!(entries.len(), symbol::MAJOR_INDICES.len() - 1);
        assert!(entries.iter().all(|e| e.symbol != "R_50"));
    }

    #[tokio::test]
    async fn fetch_errors_propagate_from_analyze() {
        let mut source = MockSource::new();
        source
            .expect_candles()
            .returning(|_, _, _| anyhow::bail!("connection refused"));

        let engine = SignalEngine::new(Arc::new(source), None);
        assert!(engine.analyze("R_25", Timeframe::M15).await.is_err());
    }
}
