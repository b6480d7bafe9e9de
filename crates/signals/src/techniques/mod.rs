pub mod breakout;
pub mod crt;
pub mod ict;
pub mod smc;

/// Candle count below which every technique reports neutral.
pub const MIN_CANDLES: usize = 50;
