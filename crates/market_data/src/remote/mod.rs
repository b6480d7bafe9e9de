use std::env;

use tracing::warn;
use url::Url;

pub mod candles_response;
pub mod deriv_client;

pub use candles_response::{
    ActiveSymbolsResponse, ApiError, CandleData, TicksHistoryResponse,
};
pub use deriv_client::DerivClient;

/// Deriv serves demo and live accounts from the same endpoint; the app_id
/// query parameter identifies the application.
pub fn get_ws_url() -> String {
    if let Ok(raw) = env::var("DERIV_WS_URL") {
        match Url::parse(&raw) {
            Ok(url) => return url.to_string(),
            Err(e) => warn!("ignoring invalid DERIV_WS_URL ({}), using the default", e),
        }
    }
    let app_id = env::var("DERIV_APP_ID").unwrap_or_else(|_| "12345".to_string());
    format!("wss://ws.binaryws.com/websockets/v3?app_id={}", app_id)
}
