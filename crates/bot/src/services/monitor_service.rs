use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use signals::SignalEngine;
use storage::repositories::AlertsRepository;

use crate::actors::{Actor, ActorType, ControlMessage};
use crate::messages;

const SCAN_INTERVAL: Duration = Duration::from_secs(60);
/// A chat hears about the same symbol at most once per cooldown.
const COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Per chat+symbol rate limiter for alert pushes. `record` only after a
/// successful delivery, so failed sends retry on the next scan.
struct CooldownGate {
    window: Duration,
    last: HashMap<(i64, String), Instant>,
}

impl CooldownGate {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    fn ready(&self, chat_id: i64, symbol: &str) -> bool {
        match self.last.get(&(chat_id, symbol.to_string())) {
            Some(&at) => at.elapsed() >= self.window,
            None => true,
        }
    }

    fn record(&mut self, chat_id: i64, symbol: &str) {
        self.last.insert((chat_id, symbol.to_string()), Instant::now());
    }
}

/// Rescans alert subscriptions and pushes a message when a signal clears
/// the confidence floor.
pub struct AlertMonitorService {
    id: Uuid,
    bot: Bot,
    engine: Arc<SignalEngine>,
    pool: SqlitePool,
    min_confidence: u8,
    cooldown: CooldownGate,
}

impl AlertMonitorService {
    pub fn new(bot: Bot, engine: Arc<SignalEngine>, pool: SqlitePool, min_confidence: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            bot,
            engine,
            pool,
            min_confidence,
            cooldown: CooldownGate::new(COOLDOWN),
        }
    }

    async fn scan(&mut self) {
        let subscriptions = match AlertsRepository::list_all(&self.pool).await {
            Ok(subs) => subs,
            Err(e) => {
                warn!("could not load alert subscriptions: {}", e);
                return;
            }
        };

        for sub in subscriptions {
            if !self.cooldown.ready(sub.chat_id, &sub.symbol) {
                continue;
            }

            let result = match self.engine.analyze(&sub.symbol, sub.timeframe).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(symbol = %sub.symbol, "alert scan failed: {}", e);
                    continue;
                }
            };

            if result.final_confidence() < self.min_confidence {
                continue;
            }

            info!(
                chat_id = sub.chat_id,
                symbol = %sub.symbol,
                confidence = result.final_confidence(),
                "pushing signal alert"
            );
            let sent = self
                .bot
                .send_message(ChatId(sub.chat_id), messages::alert_notification(&result))
                .parse_mode(ParseMode::Html)
                .await;
            match sent {
                Ok(_) => self.cooldown.record(sub.chat_id, &sub.symbol),
                Err(e) => warn!(chat_id = sub.chat_id, "alert delivery failed: {}", e),
            }
        }
    }
}

#[async_trait]
impl Actor for AlertMonitorService {
    fn name(&self) -> ActorType {
        ActorType::AlertMonitorActor
    }

    fn id(&self) -> Uuid {
        self.id
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let _heartbeat = self.spawn_heartbeat(supervisor_tx);
        info!("Starting alert monitor, scanning every {:?}", SCAN_INTERVAL);

        let mut interval = time::interval(SCAN_INTERVAL);
        loop {
            interval.tick().await;
            self.scan().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn repeat_alerts_wait_out_the_cooldown() {
        let mut gate = CooldownGate::new(COOLDOWN);

        assert!(gate.ready(1, "R_75"));
        gate.record(1, "R_75");
        assert!(!gate.ready(1, "R_75"));

        // Other chats and other symbols are not throttled.
        assert!(gate.ready(2, "R_75"));
        assert!(gate.ready(1, "R_50"));

        time::advance(COOLDOWN - Duration::from_secs(1)).await;
        assert!(!gate.ready(1, "R_75"));

        time::advance(Duration::from_secs(2)).await;
        assert!(gate.ready(1, "R_75"));
    }
}
