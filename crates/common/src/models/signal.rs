use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction emitted by every analysis technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Neutral,
}

impl Signal {
    pub fn is_directional(&self) -> bool {
        matches!(self, Signal::Buy | Signal::Sell)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => f.write_str("buy"),
            Signal::Sell => f.write_str("sell"),
            Signal::Neutral => f.write_str("neutral"),
        }
    }
}

/// Output of a single technique (breakout, ICT, SMC, CRT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueReport {
    pub technique: String,
    pub signal: Signal,
    /// Technique-local confidence, 0..=10.
    pub confidence: u8,
    pub reasoning: String,
    /// Free-form technique details shown in the report view,
    /// e.g. ("market_structure", "strong_uptrend").
    pub details: Vec<(String, String)>,
}

impl TechniqueReport {
    pub fn neutral(technique: &str, reasoning: &str) -> Self {
        Self {
            technique: technique.to_string(),
            signal: Signal::Neutral,
            confidence: 0,
            reasoning: reasoning.to_string(),
            details: Vec::new(),
        }
    }
}

/// The merged decision across all techniques.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub signal: Signal,
    /// Final confidence, always within 0..=10.
    pub confidence: u8,
    pub techniques_agreeing: usize,
    pub buy_votes: usize,
    pub sell_votes: usize,
    pub total_techniques: usize,
}

/// Entry/exit levels for a directional signal. Absent when neutral.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub breakeven: f64,
    pub atr: f64,
    /// e.g. 2.0 for a 1:2 risk/reward plan.
    pub risk_reward: f64,
}

/// What the LLM advisor said and how it changed the technical result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAdjustment {
    pub advisor_signal: Signal,
    pub advisor_confidence: u8,
    pub reasoning: String,
    pub final_signal: Signal,
    pub final_confidence: u8,
    pub approved: bool,
    pub agrees_with_technical: bool,
}

/// The one meaningful entity in the system: a complete signal for a
/// symbol/timeframe, produced fresh on every request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub symbol_name: String,
    pub timeframe: super::Timeframe,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub composite: CompositeSignal,
    pub breakout: TechniqueReport,
    pub ict: TechniqueReport,
    pub smc: TechniqueReport,
    pub crt: TechniqueReport,
    pub risk: Option<RiskLevels>,
    pub ai: Option<AiAdjustment>,
    pub market_session: String,
    pub kill_zone: String,
    pub in_kill_zone: bool,
    pub generated_at: DateTime<Utc>,
}

impl SignalResult {
    /// Signal after the advisor merge, falling back to the technical one.
    pub fn final_signal(&self) -> Signal {
        self.ai
            .as_ref()
            .map(|a| a.final_signal)
            .unwrap_or(self.composite.signal)
    }

    pub fn final_confidence(&self) -> u8 {
        self.ai
            .as_ref()
            .map(|a| a.final_confidence)
            .unwrap_or(self.composite.confidence)
    }

    /// Degraded result for symbols with no usable candle data.
    pub fn empty(symbol: &str, symbol_name: &str, timeframe: super::Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            symbol_name: symbol_name.to_string(),
            timeframe,
            current_price: 0.0,
            price_change: 0.0,
            price_change_pct: 0.0,
            composite: CompositeSignal {
                signal: Signal::Neutral,
                confidence: 0,
                techniques_agreeing: 0,
                buy_votes: 0,
                sell_votes: 0,
                total_techniques: 4,
            },
            breakout: TechniqueReport::neutral("breakout_retest", "insufficient data"),
            ict: TechniqueReport::neutral("ict", "insufficient data"),
            smc: TechniqueReport::neutral("smc", "insufficient data"),
            crt: TechniqueReport::neutral("crt", "insufficient data"),
            risk: None,
            ai: None,
            market_session: String::new(),
            kill_zone: String::new(),
            in_kill_zone: false,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeframe;

    #[test]
    fn final_values_fall_back_to_technical() {
        let mut result = SignalResult::empty("R_50", "Volatility 50 Index", Timeframe::M15);
        result.composite.signal = Signal::Buy;
        result.composite.confidence = 7;

        assert_eq!(result.final_signal(), Signal::Buy);
        assert_eq!(result.final_confidence(), 7);

        result.ai = Some(AiAdjustment {
            advisor_signal: Signal::Buy,
            advisor_confidence: 8,
            reasoning: String::new(),
            final_signal: Signal::Buy,
            final_confidence: 9,
            approved: true,
            agrees_with_technical: true,
        });
        assert_eq!(result.final_confidence(), 9);
    }

    #[test]
    fn empty_result_is_neutral() {
        let result = SignalResult::empty("R_10", "Volatility 10 Index", Timeframe::M5);
        assert_eq!(result.final_signal(), Signal::Neutral);
        assert_eq!(result.final_confidence(), 0);
        assert!(result.risk.is_none());
    }
}
