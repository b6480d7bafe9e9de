use std::env;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use common::models::{Candle, Timeframe, is_synthetic_index};

use crate::remote::candles_response::{ActiveSymbolsResponse, AuthorizeResponse, TicksHistoryResponse};
use crate::remote::get_ws_url;
use crate::traits::CandleSource;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum DerivError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("deriv api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("connection closed before a response arrived")]
    ConnectionClosed,
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("authorization rejected: {0}")]
    AuthRejected(String),
}

/// Request/response client for the Deriv websocket API. One connection,
/// lazily established and re-established after transport failures;
/// requests are matched to responses by `req_id`.
pub struct DerivClient {
    ws_url: String,
    api_token: Option<String>,
    conn: Mutex<Option<WsStream>>,
    req_id: AtomicI64,
}

impl DerivClient {
    pub fn from_env() -> Self {
        let api_token = env::var("DERIV_API_TOKEN").ok().filter(|t| !t.is_empty());
        if api_token.is_none() {
            warn!("DERIV_API_TOKEN not set, connecting unauthorized");
        }
        Self {
            ws_url: get_ws_url(),
            api_token,
            conn: Mutex::new(None),
            req_id: AtomicI64::new(0),
        }
    }

    pub async fn candles_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<Vec<Candle>, DerivError> {
        let req_id = self.next_req_id();
        let request = json!({
            "ticks_history": symbol,
            "adjust_start_time": 1,
            "count": count,
            "end": "latest",
            "style": "candles",
            "granularity": timeframe.granularity(),
            "req_id": req_id,
        });

        let raw = self.request(request, req_id).await?;
        let response: TicksHistoryResponse = serde_json::from_value(raw)?;
        if let Some(err) = response.error {
            return Err(DerivError::Api {
                code: err.code,
                message: err.message,
            });
        }

        let mut candles: Vec<Candle> = response.candles.into_iter().map(Into::into).collect();
        candles.sort_by_key(|c| c.epoch);
        info!("fetched {} candles for {} {}", candles.len(), symbol, timeframe);
        Ok(candles)
    }

    /// Synthetic indices currently tradable, filtered to the catalog.
    pub async fn active_symbols(&self) -> Result<Vec<String>, DerivError> {
        let req_id = self.next_req_id();
        let request = json!({
            "active_symbols": "brief",
            "product_type": "basic",
            "req_id": req_id,
        });

        let raw = self.request(request, req_id).await?;
        let response: ActiveSymbolsResponse = serde_json::from_value(raw)?;
        if let Some(err) = response.error {
            return Err(DerivError::Api {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response
            .active_symbols
            .into_iter()
            .map(|s| s.symbol)
            .filter(|s| is_synthetic_index(s))
            .collect())
    }

    fn next_req_id(&self) -> i64 {
        self.req_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Send one request and wait for the response carrying the same req_id.
    /// A transport failure drops the connection and retries once on a
    /// fresh one.
    async fn request(&self, payload: Value, req_id: i64) -> Result<Value, DerivError> {
        let mut guard = self.conn.lock().await;

        for attempt in 0..2 {
            if guard.is_none() {
                *guard = Some(self.open_connection().await?);
            }
            let stream = guard.as_mut().expect("connection just established");

            match Self::round_trip(stream, &payload, req_id).await {
                Ok(value) => return Ok(value),
                Err(DerivError::Api { code, message }) => {
                    return Err(DerivError::Api { code, message });
                }
                Err(e) => {
                    warn!("deriv request failed (attempt {}): {}", attempt + 1, e);
                    *guard = None;
                    if attempt == 1 {
                        return Err(e);
                    }
                }
            }
        }
        Err(DerivError::ConnectionClosed)
    }

    async fn round_trip(
        stream: &mut WsStream,
        payload: &Value,
        req_id: i64,
    ) -> Result<Value, DerivError> {
        stream.send(Message::text(payload.to_string())).await?;

        while let Some(msg) = stream.next().await {
            match msg? {
                Message::Text(text) => {
                    let value: Value = serde_json::from_str(text.as_str())?;
                    if value.get("req_id").and_then(Value::as_i64) == Some(req_id) {
                        return Ok(value);
                    }
                    // Subscription echoes or stale responses; skip.
                    debug!("skipping unmatched message: {}", value["msg_type"]);
                }
                Message::Ping(data) => {
                    stream.send(Message::Pong(data)).await?;
                }
                Message::Close(_) => return Err(DerivError::ConnectionClosed),
                _ => {}
            }
        }
        Err(DerivError::ConnectionClosed)
    }

    async fn open_connection(&self) -> Result<WsStream, DerivError> {
        let (mut stream, _) = connect_async(&self.ws_url).await?;
        info!("connected to deriv websocket");

        if let Some(token) = &self.api_token {
            stream
                .send(Message::text(json!({ "authorize": token }).to_string()))
                .await?;

            // The authorize reply is the first text frame on a new connection.
            while let Some(msg) = stream.next().await {
                match msg? {
                    Message::Text(text) => {
                        let response: AuthorizeResponse = serde_json::from_str(text.as_str())?;
                        if let Some(err) = response.error {
                            return Err(DerivError::AuthRejected(err.message));
                        }
                        info!("authorized with deriv api");
                        break;
                    }
                    Message::Ping(data) => {
                        stream.send(Message::Pong(data)).await?;
                    }
                    Message::Close(_) => return Err(DerivError::ConnectionClosed),
                    _ => {}
                }
            }
        }
        Ok(stream)
    }
}

#[async_trait]
impl CandleSource for DerivClient {
    async fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> anyhow::Result<Vec<Candle>> {
        Ok(self.candles_history(symbol, timeframe, count).await?)
    }
}
