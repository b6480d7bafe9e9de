use chrono::{DateTime, Utc};

use super::Timeframe;

/// Per-user settings row. Defaults mirror a fresh 10k demo account
/// risking 1% per trade.
#[derive(Debug, Clone)]
pub struct UserPrefs {
    pub user_id: i64,
    pub risk_percent: f64,
    pub balance: f64,
    pub alerts_enabled: bool,
    pub timezone: String,
}

impl UserPrefs {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            risk_percent: 1.0,
            balance: 10_000.0,
            alerts_enabled: false,
            timezone: "UTC".to_string(),
        }
    }

    /// Position size from risk percent and stop distance, capped at 10%
    /// of the balance.
    pub fn position_size(&self, entry: f64, stop_loss: f64) -> f64 {
        let risk_per_unit = (entry - stop_loss).abs();
        if risk_per_unit <= 0.0 {
            return 0.0;
        }
        let risk_amount = self.balance * self.risk_percent / 100.0;
        (risk_amount / risk_per_unit).min(self.balance * 0.1)
    }
}

/// One simulated order the user confirmed from the chat.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub user_id: i64,
    pub symbol: String,
    pub direction: String,
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub executed_at: DateTime<Utc>,
}

/// A chat's standing request to be notified on strong signals.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSubscription {
    pub chat_id: i64,
    pub symbol: String,
    pub timeframe: Timeframe,
}
