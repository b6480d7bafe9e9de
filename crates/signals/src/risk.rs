use common::models::{Candle, RiskLevels, Signal};

use crate::indicators;

const ATR_PERIOD: usize = 14;
const STOP_ATR: f64 = 1.5;
const TARGET_ATR: f64 = 3.0;

/// ATR-based entry plan for a directional signal. Neutral gets no levels.
pub fn levels(candles: &[Candle], signal: Signal) -> Option<RiskLevels> {
    if !signal.is_directional() || candles.is_empty() {
        return None;
    }

    let entry = candles.last()?.close;
    let atr = indicators::atr(candles, ATR_PERIOD);

    let (stop_loss, take_profit) = match signal {
        Signal::Buy => (entry - STOP_ATR * atr, entry + TARGET_ATR * atr),
        Signal::Sell => (entry + STOP_ATR * atr, entry - TARGET_ATR * atr),
        Signal::Neutral => return None,
    };

    Some(RiskLevels {
        entry,
        stop_loss,
        take_profit,
        breakeven: entry,
        atr,
        risk_reward: TARGET_ATR / STOP_ATR,
    })
}
