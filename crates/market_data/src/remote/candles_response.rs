use serde::Deserialize;

use common::models::Candle;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CandleData {
    pub epoch: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<CandleData> for Candle {
    fn from(c: CandleData) -> Self {
        Candle {
            epoch: c.epoch,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TicksHistoryResponse {
    pub error: Option<ApiError>,
    #[serde(default)]
    pub candles: Vec<CandleData>,
    pub req_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveSymbol {
    pub symbol: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveSymbolsResponse {
    pub error: Option<ApiError>,
    #[serde(default)]
    pub active_symbols: Vec<ActiveSymbol>,
    pub req_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeResponse {
    pub error: Option<ApiError>,
}
