use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use common::models::symbol::{IndexCategory, display_name, symbols_in};
use common::models::Timeframe;

use crate::callback::CallbackAction;

fn button(text: &str, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), action.encode())
}

/// Top-level category menu shown by /start.
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("📈 Volatility", CallbackAction::Category(IndexCategory::Volatility)),
            button("💥 Boom & Crash", CallbackAction::Category(IndexCategory::BoomCrash)),
        ],
        vec![
            button("🦘 Jump", CallbackAction::Category(IndexCategory::Jump)),
            button("🪜 Step", CallbackAction::Category(IndexCategory::Step)),
        ],
        vec![
            button("📊 Range Break", CallbackAction::Category(IndexCategory::RangeBreak)),
            button("🌐 Market Summary", CallbackAction::Summary),
        ],
    ])
}

/// One button per symbol in the category, two per row, plus a back button.
pub fn symbol_menu(category: IndexCategory) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = symbols_in(category)
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|sym| button(&display_name(sym), CallbackAction::PickSymbol(sym.to_string())))
                .collect()
        })
        .collect();
    rows.push(vec![button("« Back", CallbackAction::MainMenu)]);
    InlineKeyboardMarkup::new(rows)
}

/// Timeframe picker for a chosen symbol, four per row.
pub fn timeframe_menu(symbol: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Timeframe::ALL
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .map(|tf| {
                    button(
                        tf.label(),
                        CallbackAction::PickTimeframe {
                            symbol: symbol.to_string(),
                            timeframe: *tf,
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![button("« Back", CallbackAction::MainMenu)]);
    InlineKeyboardMarkup::new(rows)
}

/// What to run once symbol and timeframe are settled.
pub fn analysis_menu(symbol: &str, timeframe: Timeframe) -> InlineKeyboardMarkup {
    let sym = symbol.to_string();
    InlineKeyboardMarkup::new(vec![
        vec![button(
            "🎯 Composite Signal",
            CallbackAction::Analyze { symbol: sym.clone(), timeframe },
        )],
        vec![
            button(
                "📋 Full Report",
                CallbackAction::Report { symbol: sym.clone(), timeframe },
            ),
            button(
                "📉 Chart",
                CallbackAction::Chart { symbol: sym.clone(), timeframe },
            ),
        ],
        vec![button("« Back", CallbackAction::PickSymbol(sym))],
    ])
}

/// Action row under a delivered signal.
pub fn signal_menu(symbol: &str, timeframe: Timeframe) -> InlineKeyboardMarkup {
    let sym = symbol.to_string();
    InlineKeyboardMarkup::new(vec![
        vec![
            button(
                "🔄 Refresh",
                CallbackAction::Refresh { symbol: sym.clone(), timeframe },
            ),
            button(
                "📉 Chart",
                CallbackAction::Chart { symbol: sym.clone(), timeframe },
            ),
        ],
        vec![
            button(
                "📋 Full Report",
                CallbackAction::Report { symbol: sym.clone(), timeframe },
            ),
            button(
                "🔔 Alert Me",
                CallbackAction::Alert { symbol: sym.clone(), timeframe },
            ),
        ],
        vec![
            button(
                "💼 Place Order",
                CallbackAction::OrderPreview { symbol: sym, timeframe },
            ),
            button("« Menu", CallbackAction::MainMenu),
        ],
    ])
}

/// Risk-percent presets shown under /settings.
pub fn risk_menu() -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = [0.5, 1.0, 2.0, 5.0]
        .into_iter()
        .map(|percent| {
            button(
                &format!("{}%", percent),
                CallbackAction::SetRisk { percent },
            )
        })
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

/// Confirm/cancel row under a simulated order preview.
pub fn order_menu(symbol: &str, timeframe: Timeframe) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button(
            "✅ Execute",
            CallbackAction::OrderExecute { symbol: symbol.to_string(), timeframe },
        ),
        button("❌ Cancel", CallbackAction::Dismiss),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_menu_covers_the_whole_category() {
        let menu = symbol_menu(IndexCategory::Volatility);
        let buttons: usize = menu.inline_keyboard.iter().map(Vec::len).sum();
        // Five volatility indices plus the back button.
        assert_eq!(buttons, 6);
    }

    #[test]
    fn every_button_carries_parseable_callback_data() {
        let menus = [
            main_menu(),
            symbol_menu(IndexCategory::RangeBreak),
            timeframe_menu("STEP INDEX"),
            analysis_menu("RANGE BREAK 100", Timeframe::M5),
            signal_menu("R_75", Timeframe::M15),
            order_menu("BOOM1000", Timeframe::H1),
            risk_menu(),
        ];
        for menu in menus {
            for row in &menu.inline_keyboard {
                for btn in row {
                    let teloxide::types::InlineKeyboardButtonKind::CallbackData(data) =
                        &btn.kind
                    else {
                        panic!("unexpected button kind");
                    };
                    assert!(
                        CallbackAction::parse(data).is_some(),
                        "unparseable callback data: {}",
                        data
                    );
                }
            }
        }
    }
}
