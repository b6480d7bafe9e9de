pub mod candle;
pub mod prefs;
pub mod signal;
pub mod symbol;
pub mod timeframe;

pub use candle::Candle;
pub use prefs::{AlertSubscription, TradeRecord, UserPrefs};
pub use signal::{
    AiAdjustment, CompositeSignal, RiskLevels, Signal, SignalResult, TechniqueReport,
};
pub use symbol::{display_name, is_synthetic_index, normalize_symbol, IndexCategory};
pub use timeframe::Timeframe;
