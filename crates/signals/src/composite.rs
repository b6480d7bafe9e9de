use common::models::{CompositeSignal, Signal, TechniqueReport};

/// Votes needed before the composite commits to a direction.
const MIN_AGREEING: usize = 3;

const NEUTRAL_CONFIDENCE: u8 = 3;
const BASE_CONFIDENCE: f64 = 5.0;
const PER_VOTE: f64 = 1.5;

/// Quality bar per technique: a vote only earns its bonus when the
/// technique reported at least this much conviction of its own.
fn quality_bar(technique: &str) -> u8 {
    match technique {
        "breakout_retest" => 7,
        "ict" | "smc" => 6,
        _ => 5,
    }
}

/// Combines the four technique reports into one decision with a bounded
/// confidence score.
pub fn combine(reports: &[TechniqueReport]) -> CompositeSignal {
    let buy_votes = reports.iter().filter(|r| r.signal == Signal::Buy).count();
    let sell_votes = reports.iter().filter(|r| r.signal == Signal::Sell).count();

    let (signal, agreeing) = if buy_votes >= MIN_AGREEING {
        (Signal::Buy, buy_votes)
    } else if sell_votes >= MIN_AGREEING {
        (Signal::Sell, sell_votes)
    } else {
        (Signal::Neutral, 0)
    };

    let confidence = if signal.is_directional() {
        let bonus = reports
            .iter()
            .filter(|r| r.signal == signal && r.confidence >= quality_bar(&r.technique))
            .count() as f64;
        (BASE_CONFIDENCE + PER_VOTE * agreeing as f64 + bonus).clamp(0.0, 10.0) as u8
    } else {
        NEUTRAL_CONFIDENCE
    };

    CompositeSignal {
        signal,
        confidence,
        techniques_agreeing: agreeing,
        buy_votes,
        sell_votes,
        total_techniques: reports.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(technique: &str, signal: Signal, confidence: u8) -> TechniqueReport {
        TechniqueReport {
            technique: technique.to_string(),
            signal,
            confidence,
            reasoning: String::new(),
            details: Vec::new(),
        }
    }

    #[test]
    fn three_buy_votes_make_a_buy() {
        let composite = combine(&[
            report("breakout_retest", Signal::Buy, 5),
            report("ict", Signal::Buy, 6),
            report("smc", Signal::Buy, 6),
            report("crt", Signal::Neutral, 3),
        ]);
        assert_eq!(composite.signal, Signal::Buy);
        assert_eq!(composite.buy_votes, 3);
        assert_eq!(composite.techniques_agreeing, 3);
        // 5 base + 4.5 for votes + 2 quality bonuses (ict, smc), clamped.
        assert_eq!(composite.confidence, 10);
    }

    #[test]
    fn split_votes_stay_neutral() {
        let composite = combine(&[
            report("breakout_retest", Signal::Buy, 8),
            report("ict", Signal::Buy, 6),
            report("smc", Signal::Sell, 6),
            report("crt", Signal::Sell, 5),
        ]);
        assert_eq!(composite.signal, Signal::Neutral);
        assert_eq!(composite.confidence, 3);
        assert_eq!(composite.techniques_agreeing, 0);
    }

    #[test]
    fn all_neutral_has_low_confidence() {
        let composite = combine(&[
            report("breakout_retest", Signal::Neutral, 3),
            report("ict", Signal::Neutral, 3),
            report("smc", Signal::Neutral, 3),
            report("crt", Signal::Neutral, 3),
        ]);
        assert_eq!(composite.signal, Signal::Neutral);
        assert_eq!(composite.confidence, 3);
    }

    #[test]
    fn dissenting_technique_earns_no_quality_bonus() {
        let composite = combine(&[
            report("breakout_retest", Signal::Buy, 5),
            report("ict", Signal::Buy, 4),
            report("smc", Signal::Buy, 4),
            report("crt", Signal::Sell, 9),
        ]);
        assert_eq!(composite.signal, Signal::Buy);
        // 5 base + 4.5 for votes; the strong crt sell counts for nothing.
        assert_eq!(composite.confidence, 9);
    }

    #[test]
    fn weak_votes_earn_no_quality_bonus() {
        let composite = combine(&[
            report("breakout_retest", Signal::Sell, 5),
            report("ict", Signal::Sell, 4),
            report("smc", Signal::Sell, 4),
            report("crt", Signal::Neutral, 3),
        ]);
        assert_eq!(composite.signal, Signal::Sell);
        // 5 base + 4.5 for votes, no technique met its quality bar.
        assert_eq!(composite.confidence, 9);
    }
}
