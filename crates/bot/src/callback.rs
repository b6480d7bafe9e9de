use common::models::{IndexCategory, Timeframe};

/// Everything an inline button can ask for, encoded into callback data.
///
/// The wire format is colon separated (`an:STEP INDEX:15m`): Deriv symbols
/// contain underscores and spaces, so anything splitting on those would
/// corrupt `R_50` or `STEP INDEX`. Colons never appear in symbols.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    MainMenu,
    Category(IndexCategory),
    PickSymbol(String),
    PickTimeframe { symbol: String, timeframe: Timeframe },
    Analyze { symbol: String, timeframe: Timeframe },
    Refresh { symbol: String, timeframe: Timeframe },
    Chart { symbol: String, timeframe: Timeframe },
    Report { symbol: String, timeframe: Timeframe },
    Alert { symbol: String, timeframe: Timeframe },
    OrderPreview { symbol: String, timeframe: Timeframe },
    OrderExecute { symbol: String, timeframe: Timeframe },
    SetRisk { percent: f64 },
    Summary,
    Dismiss,
}

fn category_tag(category: IndexCategory) -> &'static str {
    match category {
        IndexCategory::Volatility => "volatility",
        IndexCategory::BoomCrash => "boomcrash",
        IndexCategory::Jump => "jump",
        IndexCategory::Step => "step",
        IndexCategory::RangeBreak => "rangebreak",
    }
}

fn parse_category(tag: &str) -> Option<IndexCategory> {
    match tag {
        "volatility" => Some(IndexCategory::Volatility),
        "boomcrash" => Some(IndexCategory::BoomCrash),
        "jump" => Some(IndexCategory::Jump),
        "step" => Some(IndexCategory::Step),
        "rangebreak" => Some(IndexCategory::RangeBreak),
        _ => None,
    }
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            Self::MainMenu => "menu".to_string(),
            Self::Category(c) => format!("cat:{}", category_tag(*c)),
            Self::PickSymbol(symbol) => format!("sym:{}", symbol),
            Self::PickTimeframe { symbol, timeframe } => format!("tf:{}:{}", symbol, timeframe),
            Self::Analyze { symbol, timeframe } => format!("an:{}:{}", symbol, timeframe),
            Self::Refresh { symbol, timeframe } => format!("re:{}:{}", symbol, timeframe),
            Self::Chart { symbol, timeframe } => format!("ch:{}:{}", symbol, timeframe),
            Self::Report { symbol, timeframe } => format!("rp:{}:{}", symbol, timeframe),
            Self::Alert { symbol, timeframe } => format!("al:{}:{}", symbol, timeframe),
            Self::OrderPreview { symbol, timeframe } => format!("op:{}:{}", symbol, timeframe),
            Self::OrderExecute { symbol, timeframe } => format!("ox:{}:{}", symbol, timeframe),
            Self::SetRisk { percent } => format!("risk:{}", percent),
            Self::Summary => "sum".to_string(),
            Self::Dismiss => "x".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.splitn(3, ':');
        let tag = parts.next()?;

        match tag {
            "menu" => Some(Self::MainMenu),
            "sum" => Some(Self::Summary),
            "x" => Some(Self::Dismiss),
            "cat" => parse_category(parts.next()?).map(Self::Category),
            "sym" => Some(Self::PickSymbol(parts.next()?.to_string())),
            "risk" => {
                let percent = parts.next()?.parse::<f64>().ok()?;
                (0.1..=10.0)
                    .contains(&percent)
                    .then_some(Self::SetRisk { percent })
            }
            _ => {
                let symbol = parts.next()?.to_string();
                let timeframe = parts.next()?.parse::<Timeframe>().ok()?;
                match tag {
                    "tf" => Some(Self::PickTimeframe { symbol, timeframe }),
                    "an" => Some(Self::Analyze { symbol, timeframe }),
                    "re" => Some(Self::Refresh { symbol, timeframe }),
                    "ch" => Some(Self::Chart { symbol, timeframe }),
                    "rp" => Some(Self::Report { symbol, timeframe }),
                    "al" => Some(Self::Alert { symbol, timeframe }),
                    "op" => Some(Self::OrderPreview { symbol, timeframe }),
                    "ox" => Some(Self::OrderExecute { symbol, timeframe }),
                    _ => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_with_underscores_and_spaces_survive() {
        for symbol in ["R_50", "STEP INDEX", "RANGE BREAK 200"] {
            let action = CallbackAction::Analyze {
                symbol: symbol.to_string(),
                timeframe: Timeframe::M15,
            };
            assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
        }
    }

    #[test]
    fn every_variant_round_trips() {
        let actions = [
            CallbackAction::MainMenu,
            CallbackAction::Category(IndexCategory::BoomCrash),
            CallbackAction::PickSymbol("BOOM1000".to_string()),
            CallbackAction::PickTimeframe {
                symbol: "STEP INDEX".to_string(),
                timeframe: Timeframe::M30,
            },
            CallbackAction::Chart {
                symbol: "R_75".to_string(),
                timeframe: Timeframe::H1,
            },
            CallbackAction::OrderExecute {
                symbol: "CRASH500".to_string(),
                timeframe: Timeframe::M5,
            },
            CallbackAction::SetRisk { percent: 0.5 },
            CallbackAction::Summary,
            CallbackAction::Dismiss,
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
        }
    }

    #[test]
    fn garbage_parses_to_none() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("an:R_50"), None);
        assert_eq!(CallbackAction::parse("an:R_50:99x"), None);
        assert_eq!(CallbackAction::parse("nope:R_50:15m"), None);
    }

    #[test]
    fn risk_levels_are_bounded() {
        assert_eq!(
            CallbackAction::parse("risk:2"),
            Some(CallbackAction::SetRisk { percent: 2.0 })
        );
        assert_eq!(CallbackAction::parse("risk:0"), None);
        assert_eq!(CallbackAction::parse("risk:50"), None);
        assert_eq!(CallbackAction::parse("risk:abc"), None);
    }

    #[test]
    fn callback_data_stays_under_telegram_limit() {
        // Telegram caps callback data at 64 bytes.
        let action = CallbackAction::OrderPreview {
            symbol: "RANGE BREAK 200".to_string(),
            timeframe: Timeframe::M30,
        };
        assert!(action.encode().len() <= 64);
    }
}
