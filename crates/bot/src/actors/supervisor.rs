use std::{collections::HashMap, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::actors::{Actor, ActorType, ControlMessage};

/// Restarts registered actors when their heartbeat goes quiet. Each actor
/// instance carries its own id, so a restarted actor never inherits stale
/// pulses from its predecessor.
pub struct Supervisor {
    actor_factories: HashMap<ActorType, Box<dyn Fn() -> Box<dyn Actor> + Send + Sync>>,
    identities: HashMap<Uuid, ActorType>,
    pulses: HashMap<Uuid, Instant>,
    handles: HashMap<Uuid, JoinHandle<()>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            actor_factories: HashMap::new(),
            identities: HashMap::new(),
            pulses: HashMap::new(),
            handles: HashMap::new(),
        }
    }

    pub fn register_actor(
        &mut self,
        actor_type: ActorType,
        factory: Box<dyn Fn() -> Box<dyn Actor> + Send + Sync>,
    ) {
        self.actor_factories.insert(actor_type, factory);
    }

    pub async fn start(&mut self) {
        let mut check_interval = time::interval(Duration::from_secs(1));
        let timeout_duration = Duration::from_secs(3);

        let (supervisor_tx, mut supervisor_rx) = mpsc::channel::<ControlMessage>(512);

        let actors: Vec<ActorType> = self.actor_factories.keys().copied().collect();
        actors.into_iter().for_each(|actor| {
            self.spawn_actor(actor, supervisor_tx.clone());
        });

        loop {
            tokio::select! {
                Some(msg) = supervisor_rx.recv() => {
                    match msg {
                        ControlMessage::Heartbeat(id) => {
                            self.note_pulse(id);
                        }
                        ControlMessage::Shutdown(id) => {
                            if let Some(actor_type) = self.identities.remove(&id) {
                                warn!("{:?} is shutting down gracefully.", actor_type);
                            }
                            self.pulses.remove(&id);
                            if let Some(handle) = self.handles.remove(&id) {
                                handle.abort();
                            }
                        },
                        ControlMessage::Error(id, error_msg) => {
                            error!("Actor {:?} reported error: {}", self.identities.get(&id), error_msg);
                            self.note_pulse(id);
                        },
                    }
                }

                _ = check_interval.tick() => {
                    let dead_timeout = Instant::now() - timeout_duration;

                    let dead: Vec<Uuid> = self
                        .pulses
                        .iter()
                        .filter(|&(_, &pulse)| pulse < dead_timeout)
                        .map(|(&id, _)| id)
                        .collect();

                    for id in dead {
                        let actor_type = match self.identities.remove(&id) {
                            Some(t) => t,
                            None => continue,
                        };
                        warn!("{:?} is unresponsive!", actor_type);
                        self.pulses.remove(&id);
                        if let Some(handle) = self.handles.remove(&id) {
                            handle.abort();
                        }
                        self.spawn_actor(actor_type, supervisor_tx.clone());
                    }
                }
            }
        }
    }

    /// An aborted actor's detached heartbeat task can keep pulsing its old
    /// id, so only ids the supervisor still tracks count.
    fn note_pulse(&mut self, id: Uuid) {
        if self.identities.contains_key(&id) {
            self.pulses.insert(id, Instant::now());
        }
    }

    fn spawn_actor(&mut self, actor_type: ActorType, tx: mpsc::Sender<ControlMessage>) {
        let mut new_actor = self.actor_factories[&actor_type]();
        let id = new_actor.id();
        let new_actor_handle = tokio::spawn(async move {
            if let Err(e) = new_actor.run(tx).await {
                error!("Actor {:?} crashed: {}", &actor_type, e);
            }
        });
        self.identities.insert(id, actor_type);
        self.handles.insert(id, new_actor_handle);
        self.pulses.insert(id, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulses_from_untracked_ids_are_dropped() {
        let mut supervisor = Supervisor::new();

        let stale = Uuid::new_v4();
        supervisor.note_pulse(stale);
        assert!(supervisor.pulses.is_empty());

        let live = Uuid::new_v4();
        supervisor
            .identities
            .insert(live, ActorType::AlertMonitorActor);
        supervisor.note_pulse(live);
        supervisor.note_pulse(stale);
        assert_eq!(supervisor.pulses.len(), 1);
        assert!(supervisor.pulses.contains_key(&live));
    }
}
