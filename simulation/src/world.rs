//! Arena World - all shared session state, guarded as one unit by the arena lock

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use tracing::{debug, info};

use crate::arena::{Arena, Placement};
use crate::components::*;
use crate::error::SimError;
use crate::systems::damage::{DamageModel, HealthChange, Player};

pub struct ArenaWorld {
    pub world: World,
    arena: Arena,
    index: HashMap<ActorId, Entity>,
    next_actor_id: u64,
    damage: DamageModel,
    player: Player,
    kills: KillCounter,
    spawned: u32,
    outcome: Option<SessionOutcome>,
    stopped: bool,
}

impl ArenaWorld {
    pub fn new(arena: Arena, base_damage: i32, starting_health: i32) -> Self {
        Self {
            world: World::new(),
            arena,
            index: HashMap::new(),
            next_actor_id: 1,
            damage: DamageModel::new(base_damage),
            player: Player::new(starting_health),
            kills: KillCounter::default(),
            spawned: 0,
            outcome: None,
            stopped: false,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn damage(&self) -> &DamageModel {
        &self.damage
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn kills(&self) -> u32 {
        self.kills.get()
    }

    /// Every actor ever created, dead or alive
    pub fn spawned_total(&self) -> u32 {
        self.spawned
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Place and add one actor, keeping clear of live actors of the same kind
    pub fn spawn_actor<R: Rng + ?Sized>(
        &mut self,
        kind: ActorKind,
        rng: &mut R,
    ) -> (ActorSnapshot, Placement) {
        let occupied = self.alive_positions(kind, None);
        let placement = self.arena.place_new(rng, &occupied);

        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;

        let entity = match kind {
            ActorKind::Attack => self.world.spawn((
                id,
                kind,
                placement.position,
                Alive,
                Attacker::default(),
            )),
            ActorKind::Defense => self.world.spawn((id, kind, placement.position, Alive)),
        };
        self.index.insert(id, entity);
        self.spawned += 1;

        if kind == ActorKind::Attack {
            self.damage.on_attack_spawn();
        }

        debug!(
            "Spawned {:?} {} at ({}, {}) after {} attempts",
            kind, id, placement.position.x, placement.position.y, placement.attempts
        );

        let snapshot = ActorSnapshot {
            id,
            kind,
            position: placement.position,
            alive: true,
        };
        (snapshot, placement)
    }

    /// Flip a live actor to dead. Returns its kind and kill number, or `None`
    /// if it was already dead.
    pub fn mark_dead(&mut self, id: ActorId) -> Result<Option<(ActorKind, u32)>, SimError> {
        let entity = self.entity(id)?;
        if self.world.remove_one::<Alive>(entity).is_err() {
            return Ok(None);
        }

        let kind = self.kind_of(id)?;
        if let Ok(mut attacker) = self.world.get::<&mut Attacker>(entity) {
            attacker.attacking = false;
        }
        if kind == ActorKind::Attack {
            self.damage.on_attack_death();
        }

        let kill_order = self.kills.record();
        let _ = self.world.insert_one(entity, Dead { kill_order });

        info!(
            "{:?} {} killed ({} of {} spawned)",
            kind, id, kill_order, self.spawned
        );
        Ok(Some((kind, kill_order)))
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    /// Jump a live actor to a random spot, ignoring separation
    pub fn wander<R: Rng + ?Sized>(&mut self, id: ActorId, rng: &mut R) -> Option<ActorSnapshot> {
        let position = self.arena.random_position(rng);
        self.move_to(id, position)
    }

    /// Move a live actor to a fresh spot clear of the other live actors of its kind
    pub fn reposition<R: Rng + ?Sized>(&mut self, id: ActorId, rng: &mut R) -> Option<ActorSnapshot> {
        let kind = self.kind_of(id).ok()?;
        let others = self.alive_positions(kind, Some(id));
        let placement = self.arena.place_new(rng, &others);
        self.move_to(id, placement.position)
    }

    fn move_to(&mut self, id: ActorId, position: Position) -> Option<ActorSnapshot> {
        let entity = *self.index.get(&id)?;
        if !self.is_alive(id) {
            return None;
        }
        if let Ok(mut current) = self.world.get::<&mut Position>(entity) {
            *current = position;
        }
        self.snapshot(id)
    }

    // ------------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------------

    pub fn set_attacking(&mut self, id: ActorId, attacking: bool) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        let mut attacker = self
            .world
            .get::<&mut Attacker>(entity)
            .map_err(|_| SimError::NotAnAttacker(id))?;
        attacker.attacking = attacking;
        Ok(())
    }

    pub fn is_attacking(&self, id: ActorId) -> bool {
        self.index
            .get(&id)
            .and_then(|&entity| self.world.get::<&Attacker>(entity).ok().map(|a| a.attacking))
            .unwrap_or(false)
            && self.is_alive(id)
    }

    /// One damage tick from attacker `id`.
    ///
    /// Does nothing once the session is over or when the attacker is dead or
    /// idle. Records the game-over outcome on the defeating hit.
    pub fn attack_tick(&mut self, id: ActorId) -> Option<HealthChange> {
        if self.stopped || !self.is_attacking(id) {
            return None;
        }

        let hit = self.damage.on_attack_tick(&mut self.player);
        debug!("{} hits player for {} (health {})", id, hit.damage, hit.health);

        if hit.defeated {
            self.finish(SessionOutcome::GameOver);
        }
        Some(hit)
    }

    // ------------------------------------------------------------------------
    // Session state
    // ------------------------------------------------------------------------

    /// Record a terminal outcome. Only the first call wins.
    pub fn finish(&mut self, outcome: SessionOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        info!("Session finished: {:?}", outcome);
        self.outcome = Some(outcome);
        self.stopped = true;
        true
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Raise the stop flag. Returns false if it was already raised.
    pub fn request_stop(&mut self) -> bool {
        !std::mem::replace(&mut self.stopped, true)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// All actors have been killed
    pub fn is_cleared(&self) -> bool {
        self.spawned > 0 && self.kills.get() == self.spawned
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn entity(&self, id: ActorId) -> Result<Entity, SimError> {
        self.index.get(&id).copied().ok_or(SimError::UnknownActor(id))
    }

    pub fn kind_of(&self, id: ActorId) -> Result<ActorKind, SimError> {
        let entity = self.entity(id)?;
        self.world
            .get::<&ActorKind>(entity)
            .map(|kind| *kind)
            .map_err(|_| SimError::UnknownActor(id))
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.index
            .get(&id)
            .map(|&entity| self.world.get::<&Alive>(entity).is_ok())
            .unwrap_or(false)
    }

    pub fn snapshot(&self, id: ActorId) -> Option<ActorSnapshot> {
        let entity = *self.index.get(&id)?;
        let mut query = self
            .world
            .query_one::<(&ActorKind, &Position, Option<&Alive>)>(entity)
            .ok()?;
        let (kind, position, alive) = query.get()?;
        Some(ActorSnapshot {
            id,
            kind: *kind,
            position: *position,
            alive: alive.is_some(),
        })
    }

    /// Snapshots of every actor, ordered by id
    pub fn snapshots(&self) -> Vec<ActorSnapshot> {
        let mut actors: Vec<ActorSnapshot> = self
            .world
            .query::<(&ActorId, &ActorKind, &Position, Option<&Alive>)>()
            .iter()
            .map(|(_, (id, kind, position, alive))| ActorSnapshot {
                id: *id,
                kind: *kind,
                position: *position,
                alive: alive.is_some(),
            })
            .collect();
        actors.sort_by_key(|a| a.id);
        actors
    }

    pub fn alive_ids(&self, kind: ActorKind) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .world
            .query::<(&ActorId, &ActorKind)>()
            .with::<&Alive>()
            .iter()
            .filter(|(_, (_, k))| **k == kind)
            .map(|(_, (id, _))| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn alive_count(&self, kind: ActorKind) -> u32 {
        self.world
            .query::<&ActorKind>()
            .with::<&Alive>()
            .iter()
            .filter(|(_, k)| **k == kind)
            .count() as u32
    }

    /// Positions of live actors of `kind`, optionally leaving one out
    pub fn alive_positions(&self, kind: ActorKind, exclude: Option<ActorId>) -> Vec<Position> {
        self.world
            .query::<(&ActorId, &ActorKind, &Position)>()
            .with::<&Alive>()
            .iter()
            .filter(|(_, (id, k, _))| **k == kind && Some(**id) != exclude)
            .map(|(_, (_, _, position))| *position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world() -> ArenaWorld {
        ArenaWorld::new(Arena::new(500, 500, 50, 50, 50, 256).unwrap(), 2, 100)
    }

    #[test]
    fn test_spawn_tracks_attackers_and_totals() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..3 {
            w.spawn_actor(ActorKind::Attack, &mut rng);
        }
        w.spawn_actor(ActorKind::Defense, &mut rng);

        assert_eq!(w.spawned_total(), 4);
        assert_eq!(w.alive_count(ActorKind::Attack), 3);
        assert_eq!(w.alive_count(ActorKind::Defense), 1);
        assert_eq!(w.damage().alive_attackers(), 3);
        assert_eq!(w.damage().current_damage(), 6);
    }

    #[test]
    fn test_same_kind_spawns_are_separated() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let (spawned, placement) = w.spawn_actor(ActorKind::Attack, &mut rng);
            assert!(placement.separated);
            for other in w.alive_positions(ActorKind::Attack, Some(spawned.id)) {
                assert!(spawned.position.chebyshev(&other) >= 50);
            }
        }
    }

    #[test]
    fn test_mark_dead_happens_once() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(2);
        let (a, _) = w.spawn_actor(ActorKind::Attack, &mut rng);

        assert_eq!(w.mark_dead(a.id).unwrap(), Some((ActorKind::Attack, 1)));
        assert_eq!(w.mark_dead(a.id).unwrap(), None);
        assert_eq!(w.kills(), 1);
        assert_eq!(w.damage().alive_attackers(), 0);
        assert!(!w.is_alive(a.id));
        assert!(!w.is_attacking(a.id));
        assert!(w.snapshot(a.id).is_some_and(|s| !s.alive));
    }

    #[test]
    fn test_dead_actors_do_not_move() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(9);
        let (d, _) = w.spawn_actor(ActorKind::Defense, &mut rng);
        assert!(w.wander(d.id, &mut rng).is_some());

        w.mark_dead(d.id).unwrap();
        let before = w.snapshot(d.id).unwrap().position;
        assert!(w.wander(d.id, &mut rng).is_none());
        assert!(w.reposition(d.id, &mut rng).is_none());
        assert_eq!(w.snapshot(d.id).unwrap().position, before);
    }

    #[test]
    fn test_attack_tick_records_game_over_once() {
        let mut w = ArenaWorld::new(Arena::new(500, 500, 50, 50, 50, 256).unwrap(), 2, 30);
        let mut rng = StdRng::seed_from_u64(4);
        let ids: Vec<ActorId> = (0..10)
            .map(|_| w.spawn_actor(ActorKind::Attack, &mut rng).0.id)
            .collect();

        assert!(!w.attack_tick(ids[0]).unwrap().defeated);
        assert!(w.attack_tick(ids[1]).unwrap().defeated);
        assert_eq!(w.outcome(), Some(SessionOutcome::GameOver));
        assert!(w.is_stopped());

        // Session over: further ticks are ignored
        assert!(w.attack_tick(ids[2]).is_none());
        assert_eq!(w.player().health(), -10);
    }

    #[test]
    fn test_idle_attacker_deals_no_damage() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(4);
        let (a, _) = w.spawn_actor(ActorKind::Attack, &mut rng);
        let (d, _) = w.spawn_actor(ActorKind::Defense, &mut rng);

        w.set_attacking(a.id, false).unwrap();
        assert!(w.attack_tick(a.id).is_none());
        assert!(matches!(w.set_attacking(d.id, true), Err(SimError::NotAnAttacker(_))));
        assert!(matches!(
            w.set_attacking(ActorId(99), true),
            Err(SimError::UnknownActor(_))
        ));

        w.set_attacking(a.id, true).unwrap();
        assert_eq!(w.attack_tick(a.id).unwrap().damage, 2);
    }

    #[test]
    fn test_first_outcome_wins() {
        let mut w = world();
        assert!(w.finish(SessionOutcome::Cleared));
        assert!(!w.finish(SessionOutcome::GameOver));
        assert_eq!(w.outcome(), Some(SessionOutcome::Cleared));
    }
}
