use async_trait::async_trait;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::actors::{Actor, ActorType, ControlMessage};
use crate::handlers::{self, BotState, Command};

/// Runs the teloxide long-polling dispatcher as a supervised actor.
pub struct DispatcherService {
    id: Uuid,
    bot: Bot,
    state: BotState,
}

impl DispatcherService {
    pub fn new(bot: Bot, state: BotState) -> Self {
        Self {
            id: Uuid::new_v4(),
            bot,
            state,
        }
    }
}

#[async_trait]
impl Actor for DispatcherService {
    fn name(&self) -> ActorType {
        ActorType::DispatcherActor
    }

    fn id(&self) -> Uuid {
        self.id
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat = self.spawn_heartbeat(supervisor_tx.clone());
        info!("Starting Telegram dispatcher");

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .branch(
                        dptree::entry()
                            .filter_command::<Command>()
                            .endpoint(handlers::handle_command),
                    )
                    .branch(
                        dptree::filter(|msg: Message| msg.text().is_some())
                            .endpoint(handlers::handle_text),
                    ),
            )
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.state.clone()])
            .default_handler(|_| async {})
            .error_handler(LoggingErrorHandler::with_custom_text("handler failed"))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        heartbeat.abort();
        let _ = supervisor_tx.send(ControlMessage::Shutdown(self.id)).await;
        Ok(())
    }
}
