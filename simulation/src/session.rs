//! Session - owns the arena and every background thread of one game
//!
//! The render/input thread drives the session through `on_click` and
//! `on_session_stop_requested`; everything else happens on the workers.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::arena::Arena;
use crate::components::{ActorId, ActorKind, ActorSnapshot, SessionOutcome};
use crate::config::{GameVariant, SessionConfig};
use crate::error::SimError;
use crate::render::{announce_outcome, RenderSink};
use crate::runners::{
    CoordinatorState, MovementWorker, SharedArena, SpawnCoordinator, SpawnSettings, WorkerPlan,
};
use crate::systems::{dispatch_click, ClickOutcome};
use crate::world::ArenaWorld;

/// Point-in-time view of the session, for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub variant: GameVariant,
    pub health: i32,
    pub kills: u32,
    pub total_spawned: u32,
    pub alive_attackers: u32,
    pub alive_defenders: u32,
    pub current_damage: i32,
    pub outcome: Option<SessionOutcome>,
    pub stopped: bool,
    pub coordinator: Option<CoordinatorState>,
}

pub struct Session {
    config: SessionConfig,
    shared: Arc<SharedArena>,
    sink: Arc<dyn RenderSink>,
    workers: Vec<MovementWorker>,
    coordinator: Option<SpawnCoordinator>,
}

impl Session {
    /// Populate the arena, publish it, and start the background threads
    pub fn start(config: SessionConfig, sink: Arc<dyn RenderSink>) -> Result<Self, SimError> {
        config.validate()?;
        let bounds = sink.report_bounds();
        let arena = Arena::from_config(&config, bounds)?;

        let mut world = ArenaWorld::new(arena, config.base_damage, config.starting_health);
        let mut rng = rand::thread_rng();
        let mut initial = Vec::new();

        // Attackers and defenders are placed in pairs
        for i in 0..config.initial_attackers.max(config.initial_defenders) {
            if i < config.initial_attackers {
                initial.push(world.spawn_actor(ActorKind::Attack, &mut rng).0);
            }
            if i < config.initial_defenders {
                initial.push(world.spawn_actor(ActorKind::Defense, &mut rng).0);
            }
        }
        let health = world.player().health();

        info!(
            "Starting {} session on {}x{} arena with {} actors",
            config.variant.key(),
            bounds.0,
            bounds.1,
            initial.len()
        );

        for actor in &initial {
            sink.upsert_actor(actor.id, actor.kind, actor.position);
        }
        sink.set_health_display(health);
        sink.set_kill_count_display(0);

        // From here on a failed thread spawn drops the session, which stops
        // and joins whatever already started
        let mut session = Self {
            shared: Arc::new(SharedArena::new(world)),
            sink,
            workers: Vec::new(),
            coordinator: None,
            config,
        };

        for actor in &initial {
            if let Some(plan) = WorkerPlan::for_actor(&session.config, actor.kind) {
                let worker = MovementWorker::spawn(
                    Arc::clone(&session.shared),
                    Arc::clone(&session.sink),
                    actor.id,
                    plan,
                )?;
                session.workers.push(worker);
            }
        }

        if let Some(interval) = session.config.spawn_interval() {
            let settings = SpawnSettings {
                interval,
                pacing_threshold: session.config.pacing_threshold,
                defender_plan: WorkerPlan::for_actor(&session.config, ActorKind::Defense),
            };
            session.coordinator = Some(SpawnCoordinator::start(
                Arc::clone(&session.shared),
                Arc::clone(&session.sink),
                settings,
            )?);
        }

        Ok(session)
    }

    /// Input callback: the player clicked actor `id` `click_count` times
    pub fn on_click(&self, id: ActorId, click_count: u32) -> Result<ClickOutcome, SimError> {
        let outcome = {
            let mut world = self.shared.lock();
            dispatch_click(&mut world, id, click_count)?
        };

        if let ClickOutcome::Killed {
            id, kills, cleared, ..
        } = outcome
        {
            // A death can release the coordinator and ends the actor's worker
            self.shared.notify_all();
            self.sink.set_visible(id, false);
            self.sink.set_kill_count_display(kills);
            if cleared {
                announce_outcome(self.sink.as_ref(), SessionOutcome::Cleared);
            }
        }

        Ok(outcome)
    }

    /// Input callback: stop everything without a terminal outcome
    pub fn on_session_stop_requested(&self) {
        if self.shared.request_stop() {
            info!("Session stop requested");
        }
    }

    pub fn set_attacking(&self, id: ActorId, attacking: bool) -> Result<(), SimError> {
        let mut world = self.shared.lock();
        if world.outcome().is_some() {
            return Err(SimError::SessionFinished);
        }
        world.set_attacking(id, attacking)
    }

    pub fn status(&self) -> SessionStatus {
        let coordinator = self.coordinator.as_ref().map(|c| c.state());
        let world = self.shared.lock();
        SessionStatus {
            variant: self.config.variant,
            health: world.player().health(),
            kills: world.kills(),
            total_spawned: world.spawned_total(),
            alive_attackers: world.alive_count(ActorKind::Attack),
            alive_defenders: world.alive_count(ActorKind::Defense),
            current_damage: world.damage().current_damage(),
            outcome: world.outcome(),
            stopped: world.is_stopped(),
            coordinator,
        }
    }

    pub fn actors(&self) -> Vec<ActorSnapshot> {
        self.shared.lock().snapshots()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.shared.lock().outcome()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Stop the session and wait for every thread to exit
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.shared.request_stop();

        if let Some(mut coordinator) = self.coordinator.take() {
            coordinator.stop();
        }
        for worker in self.workers.drain(..) {
            worker.join();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
