use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use common::models::Timeframe;

/// What the user is currently looking at. Free-text symbol input and the
/// settings flow both read and update this.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    pub symbol: Option<String>,
    pub timeframe: Timeframe,
    pub awaiting_risk_input: bool,
}

/// In-memory per-chat session map, shared across handlers.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<i64, UserSession>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: i64) -> UserSession {
        self.inner.lock().await.get(&chat_id).cloned().unwrap_or_default()
    }

    pub async fn update(&self, chat_id: i64, f: impl FnOnce(&mut UserSession)) {
        let mut map = self.inner.lock().await;
        f(map.entry(chat_id).or_default());
    }
}
