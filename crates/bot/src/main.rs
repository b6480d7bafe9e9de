use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::Bot;
use tracing::debug;

use common::actors::ActorType;
use common::logger;
use market_data::{CandleSource, DerivClient};
use signals::{GroqAdvisor, SignalEngine};

use crate::actors::supervisor::Supervisor;
use crate::config::Config;
use crate::handlers::BotState;
use crate::services::dispatcher_service::DispatcherService;
use crate::services::monitor_service::AlertMonitorService;
use crate::session::Sessions;

mod actors;
mod callback;
mod chart;
mod config;
mod handlers;
mod keyboards;
mod lock;
mod messages;
mod services;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = Config::from_env();
    let _lock = lock::InstanceLock::acquire(&config.workdir)?;
    let pool = storage::db::connect(&config.workdir).await?;

    let source: Arc<dyn CandleSource> = Arc::new(DerivClient::from_env());
    let engine = Arc::new(SignalEngine::new(source.clone(), GroqAdvisor::from_env()));

    let bot = Bot::new(config.bot_token.clone());
    let state = BotState {
        engine: engine.clone(),
        source,
        pool: pool.clone(),
        sessions: Sessions::new(),
        min_confidence: config.min_signal_confidence,
    };

    let mut supervisor = Supervisor::new();

    let bot_for_dispatcher = bot.clone();
    let state_for_dispatcher = state.clone();
    supervisor.register_actor(
        ActorType::DispatcherActor,
        Box::new(move || {
            Box::new(DispatcherService::new(
                bot_for_dispatcher.clone(),
                state_for_dispatcher.clone(),
            ))
        }),
    );

    let bot_for_monitor = bot.clone();
    let engine_for_monitor = engine.clone();
    let pool_for_monitor = pool.clone();
    let min_confidence = config.min_signal_confidence;
    supervisor.register_actor(
        ActorType::AlertMonitorActor,
        Box::new(move || {
            Box::new(AlertMonitorService::new(
                bot_for_monitor.clone(),
                engine_for_monitor.clone(),
                pool_for_monitor.clone(),
                min_confidence,
            ))
        }),
    );

    // Returning from main drops the instance lock, so wait for a
    // termination signal instead of letting the supervisor run forever.
    tokio::select! {
        _ = supervisor.start() => {}
        _ = shutdown_signal() => {
            debug!("Shutdown signal received, stopping...");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
