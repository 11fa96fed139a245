//! Movement Worker - one background thread per live actor
//!
//! Each tick the actor jumps to a random spot in the arena. Attack actors
//! also hit the player on their own, slower cadence. The thread ends when
//! its actor dies, the session stops, or it has nothing left to do.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::components::{ActorId, ActorKind, SessionOutcome};
use crate::config::SessionConfig;
use crate::error::SimError;
use crate::render::{announce_outcome, RenderSink};
use crate::runners::shared::SharedArena;

/// What a worker does for its actor, and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPlan {
    pub move_every: Option<Duration>,
    pub attack_every: Option<Duration>,
}

impl WorkerPlan {
    /// Plan for an actor of `kind`, or `None` if it never needs a thread
    pub fn for_actor(config: &SessionConfig, kind: ActorKind) -> Option<Self> {
        let plan = match kind {
            ActorKind::Attack => Self {
                move_every: config.attack_move_interval(),
                attack_every: Some(config.attack_interval()),
            },
            ActorKind::Defense => Self {
                move_every: config.defense_move_interval(),
                attack_every: None,
            },
        };
        (plan.move_every.is_some() || plan.attack_every.is_some()).then_some(plan)
    }
}

pub struct MovementWorker {
    id: ActorId,
    thread_handle: Option<JoinHandle<()>>,
}

impl MovementWorker {
    pub fn spawn(
        shared: Arc<SharedArena>,
        sink: Arc<dyn RenderSink>,
        id: ActorId,
        plan: WorkerPlan,
    ) -> Result<Self, SimError> {
        let handle = thread::Builder::new()
            .name(format!("actor-{}", id.0))
            .spawn(move || run(&shared, sink.as_ref(), id, plan))?;

        Ok(Self {
            id,
            thread_handle: Some(handle),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.thread_handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the thread to exit. Does not stop it.
    pub fn join(mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Worker for actor {} panicked", self.id);
            }
        }
    }
}

fn run(shared: &SharedArena, sink: &dyn RenderSink, id: ActorId, plan: WorkerPlan) {
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut next_move = plan.move_every.map(|every| start + every);
    let mut next_attack = plan.attack_every.map(|every| start + every);

    loop {
        let Some(deadline) = [next_move, next_attack].into_iter().flatten().min() else {
            break;
        };

        // Stop or death ends the worker without finishing the sleep
        if !shared.sleep_until(deadline, |world| !world.is_alive(id)) {
            break;
        }
        let now = Instant::now();

        if let (Some(due), Some(every)) = (next_move, plan.move_every) {
            if due <= now {
                let moved = {
                    let mut world = shared.lock();
                    if world.is_stopped() {
                        break;
                    }
                    world.wander(id, &mut rng)
                };
                let Some(actor) = moved else {
                    break;
                };

                debug!("{} moved to ({}, {})", id, actor.position.x, actor.position.y);
                sink.upsert_actor(actor.id, actor.kind, actor.position);
                next_move = Some(due + every);
            }
        }

        if let (Some(due), Some(every)) = (next_attack, plan.attack_every) {
            if due <= now {
                let hit = shared.lock().attack_tick(id);
                next_attack = Some(due + every);

                if let Some(hit) = hit {
                    sink.set_health_display(hit.health);
                    if hit.defeated {
                        shared.notify_all();
                        announce_outcome(sink, SessionOutcome::GameOver);
                        break;
                    }
                }
            }
        }
    }

    debug!("Worker for actor {} stopped", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::config::GameVariant;
    use crate::render::testing::{RecordingSink, SinkCall};
    use crate::world::ArenaWorld;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup(health: i32, attackers: u32) -> (Arc<SharedArena>, Arc<RecordingSink>, Vec<ActorId>) {
        let arena = Arena::new(500, 500, 50, 50, 50, 256).unwrap();
        let mut world = ArenaWorld::new(arena, 2, health);
        let mut rng = StdRng::seed_from_u64(8);
        let ids = (0..attackers)
            .map(|_| world.spawn_actor(ActorKind::Attack, &mut rng).0.id)
            .collect();
        (
            Arc::new(SharedArena::new(world)),
            Arc::new(RecordingSink::new(500, 500)),
            ids,
        )
    }

    #[test]
    fn test_plans_follow_variant() {
        let classic = SessionConfig::preset(GameVariant::Classic);
        let paced = SessionConfig::preset(GameVariant::Paced);

        let defense = WorkerPlan::for_actor(&classic, ActorKind::Defense).unwrap();
        assert_eq!(defense.move_every, Some(Duration::from_millis(1000)));
        assert_eq!(defense.attack_every, None);

        assert!(WorkerPlan::for_actor(&paced, ActorKind::Defense).is_none());

        let attack = WorkerPlan::for_actor(&paced, ActorKind::Attack).unwrap();
        assert_eq!(attack.move_every, Some(Duration::from_millis(500)));
        assert_eq!(attack.attack_every, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn test_worker_moves_actor_until_stopped() {
        let (shared, sink, ids) = setup(100, 1);
        let plan = WorkerPlan {
            move_every: Some(Duration::from_millis(10)),
            attack_every: None,
        };
        let worker = MovementWorker::spawn(
            Arc::clone(&shared),
            Arc::clone(&sink) as Arc<dyn RenderSink>,
            ids[0],
            plan,
        )
        .unwrap();

        thread::sleep(Duration::from_millis(150));
        shared.request_stop();
        worker.join();

        let moves = sink.count(|c| matches!(c, SinkCall::Upsert(..)));
        assert!(moves >= 3, "expected several moves, got {}", moves);

        // Nothing is published after the stop
        let after = sink.calls().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(sink.calls().len(), after);
    }

    #[test]
    fn test_worker_exits_when_actor_dies() {
        let (shared, sink, ids) = setup(100, 1);
        let plan = WorkerPlan {
            move_every: Some(Duration::from_secs(60)),
            attack_every: Some(Duration::from_secs(60)),
        };
        let worker = MovementWorker::spawn(
            Arc::clone(&shared),
            Arc::clone(&sink) as Arc<dyn RenderSink>,
            ids[0],
            plan,
        )
        .unwrap();

        shared.lock().mark_dead(ids[0]).unwrap();
        shared.notify_all();

        let start = Instant::now();
        while !worker.is_finished() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.is_finished());
        worker.join();
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_attack_ticks_end_in_single_game_over() {
        // 3 attackers at 6 damage each: health 10 falls on the second hit
        let (shared, sink, ids) = setup(10, 3);
        let plan = WorkerPlan {
            move_every: None,
            attack_every: Some(Duration::from_millis(20)),
        };
        let workers: Vec<MovementWorker> = ids
            .iter()
            .map(|&id| {
                MovementWorker::spawn(
                    Arc::clone(&shared),
                    Arc::clone(&sink) as Arc<dyn RenderSink>,
                    id,
                    plan,
                )
                .unwrap()
            })
            .collect();

        let start = Instant::now();
        while !workers.iter().all(|w| w.is_finished()) && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        for worker in workers {
            worker.join();
        }

        assert_eq!(shared.lock().outcome(), Some(SessionOutcome::GameOver));
        assert_eq!(shared.lock().player().health(), -2);
        assert_eq!(sink.count(|c| *c == SinkCall::Message("Game Over!".into())), 1);
        assert_eq!(sink.count(|c| *c == SinkCall::Terminate), 1);
        assert_eq!(sink.count(|c| matches!(c, SinkCall::Health(_))), 2);
    }
}
