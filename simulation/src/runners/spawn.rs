//! Spawn Coordinator - background thread that paces defender spawns
//!
//! Every tick it adds one defense actor, reshuffles the live attackers, then
//! parks until at least `pacing_threshold` attackers are alive. Only a state
//! change (spawn, death, stop) wakes it to re-check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::components::{ActorKind, ActorSnapshot};
use crate::error::SimError;
use crate::render::RenderSink;
use crate::runners::movement::{MovementWorker, WorkerPlan};
use crate::runners::shared::SharedArena;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnSettings {
    pub interval: Duration,
    pub pacing_threshold: u32,
    /// Worker plan for spawned defenders, `None` if they stand still
    pub defender_plan: Option<WorkerPlan>,
}

pub struct SpawnCoordinator {
    is_running: Arc<AtomicBool>,
    is_blocked: Arc<AtomicBool>,
    shared: Arc<SharedArena>,
    thread_handle: Option<JoinHandle<()>>,
}

impl SpawnCoordinator {
    /// Start ticking. The initial batch must already be in the arena.
    pub fn start(
        shared: Arc<SharedArena>,
        sink: Arc<dyn RenderSink>,
        settings: SpawnSettings,
    ) -> Result<Self, SimError> {
        info!(
            "Starting spawn coordinator ({}ms intervals, threshold {})",
            settings.interval.as_millis(),
            settings.pacing_threshold
        );

        let is_running = Arc::new(AtomicBool::new(true));
        let is_blocked = Arc::new(AtomicBool::new(false));

        let handle = {
            let shared = Arc::clone(&shared);
            let running = Arc::clone(&is_running);
            let blocked = Arc::clone(&is_blocked);
            thread::Builder::new()
                .name("spawn-coordinator".into())
                .spawn(move || {
                    let workers = run(&shared, &sink, settings, &blocked);
                    running.store(false, Ordering::Release);

                    for worker in workers {
                        worker.join();
                    }
                    info!("Spawn coordinator stopped");
                })?
        };

        Ok(Self {
            is_running,
            is_blocked,
            shared,
            thread_handle: Some(handle),
        })
    }

    pub fn state(&self) -> CoordinatorState {
        if self.is_running.load(Ordering::Acquire) {
            CoordinatorState::Running
        } else {
            CoordinatorState::Stopped
        }
    }

    /// Parked on the population condition right now
    pub fn is_blocked(&self) -> bool {
        self.is_blocked.load(Ordering::Acquire)
    }

    /// Stop the session and wait for the coordinator to exit
    pub fn stop(&mut self) {
        self.shared.request_stop();

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Spawn coordinator panicked");
            }
        }
    }
}

impl Drop for SpawnCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tick loop. Returns the workers it started so the caller can join them.
fn run(
    shared: &Arc<SharedArena>,
    sink: &Arc<dyn RenderSink>,
    settings: SpawnSettings,
    blocked: &AtomicBool,
) -> Vec<MovementWorker> {
    let mut rng = rand::thread_rng();
    let mut workers = Vec::new();

    while shared.sleep_for(settings.interval) {
        // Add one defender
        let spawned = {
            let mut world = shared.lock();
            if world.is_stopped() {
                break;
            }
            let (actor, _) = world.spawn_actor(ActorKind::Defense, &mut rng);
            actor
        };
        shared.notify_all();
        sink.upsert_actor(spawned.id, spawned.kind, spawned.position);
        debug!("Coordinator spawned defender {}", spawned.id);

        if let Some(plan) = settings.defender_plan {
            match MovementWorker::spawn(Arc::clone(shared), Arc::clone(sink), spawned.id, plan) {
                Ok(worker) => workers.push(worker),
                Err(e) => warn!("Could not start worker for {}: {}", spawned.id, e),
            }
        }

        // Reshuffle live attackers, keeping them apart
        let moved = {
            let mut world = shared.lock();
            if world.is_stopped() {
                break;
            }
            let ids = world.alive_ids(ActorKind::Attack);
            let moved: Vec<ActorSnapshot> = ids
                .into_iter()
                .filter_map(|id| world.reposition(id, &mut rng))
                .collect();
            moved
        };
        for actor in &moved {
            sink.upsert_actor(actor.id, actor.kind, actor.position);
        }

        // Park until enough attackers are alive
        blocked.store(true, Ordering::Release);
        let stopped = shared
            .wait_until(|world| world.damage().alive_attackers() >= settings.pacing_threshold)
            .is_stopped();
        blocked.store(false, Ordering::Release);
        if stopped {
            break;
        }
    }

    workers
}
