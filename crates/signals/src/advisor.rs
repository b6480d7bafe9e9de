use anyhow::{Context, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use common::models::{AiAdjustment, Signal, SignalResult};

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_MIN_SCORE: u8 = 7;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// LLM second opinion over the technical analysis. The advisor never
/// flips the technical signal, it only moves the confidence and flags
/// whether the setup is approved for a simulated order.
pub struct GroqAdvisor {
    client: reqwest::Client,
    api_key: String,
    min_score: u8,
}

impl GroqAdvisor {
    /// Present only when `GROQ_API_KEY` is set; the engine runs without it.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty())?;
        let min_score = std::env::var("AI_APPROVAL_MIN_SCORE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_SCORE);
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            min_score,
        })
    }

    pub async fn advise(&self, result: &SignalResult) -> anyhow::Result<AiAdjustment> {
        let prompt = build_prompt(result);
        debug!(symbol = %result.symbol, "requesting advisor opinion");

        let body = json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a disciplined trading analyst. Reply with \
                                SIGNAL: BUY, SELL or NEUTRAL, CONFIDENCE: X/10, \
                                and one short line of reasoning."
                },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.3,
            "max_tokens": 200,
        });

        let response = self
            .client
            .post(GROQ_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("advisor request failed")?
            .error_for_status()
            .context("advisor returned an error status")?
            .json::<ChatResponse>()
            .await
            .context("advisor response was not valid JSON")?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| anyhow!("advisor returned no choices"))?;

        let advisor_signal = parse_signal(content).unwrap_or_else(|| {
            warn!("advisor reply had no SIGNAL line, treating as neutral");
            Signal::Neutral
        });
        let advisor_confidence = parse_confidence(content).unwrap_or(5);

        Ok(merge(
            result,
            advisor_signal,
            advisor_confidence,
            reasoning_line(content),
            self.min_score,
        ))
    }
}

fn build_prompt(result: &SignalResult) -> String {
    let mut prompt = format!(
        "Review this technical analysis of {} ({} timeframe), current price {:.5}:\n",
        result.symbol_name,
        result.timeframe.label(),
        result.current_price,
    );
    for report in [&result.breakout, &result.ict, &result.smc, &result.crt] {
        prompt.push_str(&format!(
            "- {}: {} ({}/10), {}\n",
            report.technique, report.signal, report.confidence, report.reasoning
        ));
    }
    prompt.push_str(&format!(
        "Composite: {} with confidence {}/10 ({} of {} techniques agreeing).\n\
         Session: {}, {}.\nDo you agree with the composite signal?",
        result.composite.signal,
        result.composite.confidence,
        result.composite.techniques_agreeing,
        result.composite.total_techniques,
        result.market_session,
        result.kill_zone,
    ));
    prompt
}

/// Merge rule: the technical signal stands; advisor agreement moves the
/// confidence +2, disagreement -2, clamped to the 0..=10 scale.
fn merge(
    result: &SignalResult,
    advisor_signal: Signal,
    advisor_confidence: u8,
    reasoning: String,
    min_score: u8,
) -> AiAdjustment {
    let technical = result.composite.signal;
    let agrees = advisor_signal == technical;
    let shift: i16 = if agrees { 2 } else { -2 };
    let final_confidence = (result.composite.confidence as i16 + shift).clamp(0, 10) as u8;

    AiAdjustment {
        advisor_signal,
        advisor_confidence,
        reasoning,
        final_signal: technical,
        final_confidence,
        approved: advisor_confidence >= min_score,
        agrees_with_technical: agrees,
    }
}

fn parse_signal(content: &str) -> Option<Signal> {
    let upper = content.to_uppercase();
    let rest = &upper[upper.find("SIGNAL:")? + "SIGNAL:".len()..];
    let word = rest.split_whitespace().next()?;
    match word.trim_matches(|c: char| !c.is_ascii_alphabetic()) {
        "BUY" => Some(Signal::Buy),
        "SELL" => Some(Signal::Sell),
        "NEUTRAL" => Some(Signal::Neutral),
        _ => None,
    }
}

/// Reads the number out of a `CONFIDENCE: X/10` line, tolerating a bare
/// `CONFIDENCE: X` as well.
fn parse_confidence(content: &str) -> Option<u8> {
    let upper = content.to_uppercase();
    let rest = &upper[upper.find("CONFIDENCE:")? + "CONFIDENCE:".len()..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u8>().ok().map(|v| v.min(10))
}

/// The first line that is neither the SIGNAL nor the CONFIDENCE marker.
fn reasoning_line(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.to_uppercase().starts_with("SIGNAL:")
                && !line.to_uppercase().starts_with("CONFIDENCE:")
        })
        .unwrap_or("no reasoning given")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Timeframe;

    fn technical(signal: Signal, confidence: u8) -> SignalResult {
        let mut result = SignalResult::empty("R_75", "Volatility 75 Index", Timeframe::M15);
        result.composite.signal = signal;
        result.composite.confidence = confidence;
        result
    }

    #[test]
    fn parses_a_well_formed_reply() {
        let reply = "SIGNAL: BUY\nCONFIDENCE: 8/10\nMomentum supports the breakout.";
        assert_eq!(parse_signal(reply), Some(Signal::Buy));
        assert_eq!(parse_confidence(reply), Some(8));
        assert_eq!(reasoning_line(reply), "Momentum supports the breakout.");
    }

    #[test]
    fn confidence_is_capped_at_ten() {
        assert_eq!(parse_confidence("CONFIDENCE: 15/10"), Some(10));
        assert_eq!(parse_confidence("no number here"), None);
    }

    #[test]
    fn agreement_boosts_confidence() {
        let adjustment = merge(
            &technical(Signal::Buy, 7),
            Signal::Buy,
            9,
            String::new(),
            7,
        );
        assert_eq!(adjustment.final_signal, Signal::Buy);
        assert_eq!(adjustment.final_confidence, 9);
        assert!(adjustment.approved);
        assert!(adjustment.agrees_with_technical);
    }

    #[test]
    fn disagreement_never_flips_the_signal() {
        let adjustment = merge(
            &technical(Signal::Sell, 8),
            Signal::Buy,
            6,
            String::new(),
            7,
        );
        assert_eq!(adjustment.final_signal, Signal::Sell);
        assert_eq!(adjustment.final_confidence, 6);
        assert!(!adjustment.approved);
        assert!(!adjustment.agrees_with_technical);
    }

    #[test]
    fn merge_clamps_at_the_scale_edges() {
        let low = merge(&technical(Signal::Buy, 1), Signal::Sell, 5, String::new(), 7);
        assert_eq!(low.final_confidence, 0);
        let high = merge(&technical(Signal::Buy, 9), Signal::Buy, 9, String::new(), 7);
        assert_eq!(high.final_confidence, 10);
    }
}
