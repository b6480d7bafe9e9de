/// Catalog of Deriv synthetic indices the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexCategory {
    Volatility,
    BoomCrash,
    Jump,
    Step,
    RangeBreak,
}

pub const SYNTHETIC_INDICES: &[(&str, &str, IndexCategory)] = &[
    ("R_10", "Volatility 10 Index", IndexCategory::Volatility),
    ("R_25", "Volatility 25 Index", IndexCategory::Volatility),
    ("R_50", "Volatility 50 Index", IndexCategory::Volatility),
    ("R_75", "Volatility 75 Index", IndexCategory::Volatility),
    ("R_100", "Volatility 100 Index", IndexCategory::Volatility),
    ("BOOM1000", "Boom 1000 Index", IndexCategory::BoomCrash),
    ("BOOM500", "Boom 500 Index", IndexCategory::BoomCrash),
    ("BOOM300", "Boom 300 Index", IndexCategory::BoomCrash),
    ("CRASH1000", "Crash 1000 Index", IndexCategory::BoomCrash),
    ("CRASH500", "Crash 500 Index", IndexCategory::BoomCrash),
    ("CRASH300", "Crash 300 Index", IndexCategory::BoomCrash),
    ("STEP INDEX", "Step Index", IndexCategory::Step),
    ("JUMP10", "Jump 10 Index", IndexCategory::Jump),
    ("JUMP25", "Jump 25 Index", IndexCategory::Jump),
    ("JUMP50", "Jump 50 Index", IndexCategory::Jump),
    ("JUMP75", "Jump 75 Index", IndexCategory::Jump),
    ("JUMP100", "Jump 100 Index", IndexCategory::Jump),
    ("RANGE BREAK 200", "Range Break 200 Index", IndexCategory::RangeBreak),
    ("RANGE BREAK 100", "Range Break 100 Index", IndexCategory::RangeBreak),
    ("RANGE BREAK 50", "Range Break 50 Index", IndexCategory::RangeBreak),
];

/// Symbols shown in the /summary overview.
pub const MAJOR_INDICES: &[&str] = &[
    "R_10", "R_25", "R_50", "R_75", "R_100", "BOOM1000", "CRASH1000",
];

pub fn is_synthetic_index(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    SYNTHETIC_INDICES.iter().any(|(s, _, _)| *s == upper)
}

pub fn display_name(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    SYNTHETIC_INDICES
        .iter()
        .find(|(s, _, _)| *s == upper)
        .map(|(_, name, _)| name.to_string())
        .unwrap_or(upper)
}

pub fn symbols_in(cat: IndexCategory) -> Vec<&'static str> {
    SYNTHETIC_INDICES
        .iter()
        .filter(|(_, _, c)| *c == cat)
        .map(|(s, _, _)| *s)
        .collect()
}

/// Map common user shorthand onto the Deriv symbol.
pub fn normalize_symbol(input: &str) -> String {
    let upper = input.trim().to_uppercase();
    match upper.as_str() {
        "VOL10" => "R_10".to_string(),
        "VOL25" => "R_25".to_string(),
        "VOL50" => "R_50".to_string(),
        "VOL75" => "R_75".to_string(),
        "VOL100" => "R_100".to_string(),
        "BOOM" => "BOOM1000".to_string(),
        "CRASH" => "CRASH1000".to_string(),
        "STEP" => "STEP INDEX".to_string(),
        _ => upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize() {
        assert_eq!(normalize_symbol("vol75"), "R_75");
        assert_eq!(normalize_symbol("boom"), "BOOM1000");
        assert_eq!(normalize_symbol("step"), "STEP INDEX");
        assert_eq!(normalize_symbol(" r_50 "), "R_50");
    }

    #[test]
    fn catalog_lookup() {
        assert!(is_synthetic_index("R_100"));
        assert!(is_synthetic_index("step index"));
        assert!(!is_synthetic_index("BTCUSDT"));
        assert_eq!(display_name("BOOM1000"), "Boom 1000 Index");
        // Unknown symbols fall back to the uppercased input
        assert_eq!(display_name("eurusd"), "EURUSD");
    }

    #[test]
    fn categories_partition_the_catalog() {
        let total: usize = [
            IndexCategory::Volatility,
            IndexCategory::BoomCrash,
            IndexCategory::Jump,
            IndexCategory::Step,
            IndexCategory::RangeBreak,
        ]
        .into_iter()
        .map(|c| symbols_in(c).len())
        .sum();
        assert_eq!(total, SYNTHETIC_INDICES.len());
    }
}
