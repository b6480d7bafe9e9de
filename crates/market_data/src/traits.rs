use async_trait::async_trait;

use common::models::{Candle, Timeframe};

/// Seam between the signal engine and the price feed. The engine only ever
/// needs a window of candles; the live implementation is `DerivClient`.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> anyhow::Result<Vec<Candle>>;
}
