use std::env;

/// Runtime configuration, read once at startup. Missing critical values
/// panic here rather than surfacing later as opaque API errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub workdir: String,
    /// Merged confidence an alert must reach before the monitor notifies.
    pub min_signal_confidence: u8,
}

impl Config {
    pub fn from_env() -> Self {
        let bot_token = env::var("BOT_TOKEN").expect("BOT_TOKEN not set in .env");
        let workdir = env::var("WORKDIR").unwrap_or_else(|_| ".".to_string());
        let min_signal_confidence = env::var("MIN_SIGNAL_CONFIDENCE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        Self {
            bot_token,
            workdir,
            min_signal_confidence,
        }
    }
}
