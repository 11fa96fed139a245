//! Click System
//!
//! Turns a click on an actor into a kill. Attack actors die on any click,
//! defense actors only on a double-click. Single clicks never add up.

use serde::Serialize;

use crate::components::{ActorId, ActorKind, SessionOutcome};
use crate::error::SimError;
use crate::world::ArenaWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Nothing changed (dead target, single click on a defender, or session over)
    Ignored,
    Killed {
        id: ActorId,
        kind: ActorKind,
        kills: u32,
        /// This kill emptied the arena
        cleared: bool,
    },
}

/// Does this click kill an actor of `kind`?
pub fn is_lethal(kind: ActorKind, click_count: u32) -> bool {
    match kind {
        ActorKind::Attack => true,
        ActorKind::Defense => click_count == 2,
    }
}

/// Apply one click. Must be called with the arena lock held.
pub fn dispatch_click(
    world: &mut ArenaWorld,
    id: ActorId,
    click_count: u32,
) -> Result<ClickOutcome, SimError> {
    let kind = world.kind_of(id)?;

    if world.is_stopped() || !world.is_alive(id) || !is_lethal(kind, click_count) {
        return Ok(ClickOutcome::Ignored);
    }

    let Some((kind, kills)) = world.mark_dead(id)? else {
        return Ok(ClickOutcome::Ignored);
    };

    // Kill count meets the number of actors ever spawned
    let cleared = world.is_cleared() && world.finish(SessionOutcome::Cleared);

    Ok(ClickOutcome::Killed {
        id,
        kind,
        kills,
        cleared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn populated(attackers: u32, defenders: u32) -> (ArenaWorld, Vec<ActorId>, Vec<ActorId>) {
        let mut world = ArenaWorld::new(Arena::new(500, 500, 50, 50, 50, 256).unwrap(), 2, 100);
        let mut rng = StdRng::seed_from_u64(21);
        let a = (0..attackers)
            .map(|_| world.spawn_actor(ActorKind::Attack, &mut rng).0.id)
            .collect();
        let d = (0..defenders)
            .map(|_| world.spawn_actor(ActorKind::Defense, &mut rng).0.id)
            .collect();
        (world, a, d)
    }

    #[test]
    fn test_attacker_dies_on_any_click() {
        for click_count in [0, 1, 2, 3] {
            let (mut world, a, _) = populated(2, 0);
            let outcome = dispatch_click(&mut world, a[0], click_count).unwrap();
            assert!(matches!(outcome, ClickOutcome::Killed { kills: 1, .. }));
            assert_eq!(world.damage().alive_attackers(), 1);
            assert_eq!(world.damage().current_damage(), 2);
        }
    }

    #[test]
    fn test_single_clicks_never_kill_defender() {
        let (mut world, _, d) = populated(1, 1);
        for _ in 0..10 {
            assert_eq!(dispatch_click(&mut world, d[0], 1).unwrap(), ClickOutcome::Ignored);
        }
        assert!(world.is_alive(d[0]));
        assert_eq!(world.kills(), 0);

        let outcome = dispatch_click(&mut world, d[0], 2).unwrap();
        assert!(matches!(outcome, ClickOutcome::Killed { kind: ActorKind::Defense, .. }));
        assert!(!world.is_alive(d[0]));
    }

    #[test]
    fn test_dead_target_is_ignored() {
        let (mut world, a, _) = populated(2, 0);
        dispatch_click(&mut world, a[0], 1).unwrap();
        assert_eq!(dispatch_click(&mut world, a[0], 1).unwrap(), ClickOutcome::Ignored);
        assert_eq!(world.kills(), 1);
        assert_eq!(world.damage().alive_attackers(), 1);
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let (mut world, _, _) = populated(1, 0);
        assert!(matches!(
            dispatch_click(&mut world, ActorId(404), 1),
            Err(SimError::UnknownActor(ActorId(404)))
        ));
    }

    #[test]
    fn test_cleared_fires_on_last_kill_only() {
        let (mut world, a, d) = populated(10, 10);
        let mut cleared_at = Vec::new();

        // Interleave kinds; defenders get a single click first that must not count
        for (attacker, defender) in a.iter().zip(d.iter()) {
            dispatch_click(&mut world, *defender, 1).unwrap();
            for (target, clicks) in [(*attacker, 1), (*defender, 2)] {
                if let ClickOutcome::Killed { kills, cleared, .. } =
                    dispatch_click(&mut world, target, clicks).unwrap()
                {
                    if cleared {
                        cleared_at.push(kills);
                    }
                }
            }
        }

        assert_eq!(cleared_at, vec![20]);
        assert_eq!(world.outcome(), Some(SessionOutcome::Cleared));
    }

    #[test]
    fn test_clicks_ignored_after_session_ends() {
        let (mut world, a, _) = populated(2, 0);
        world.finish(SessionOutcome::GameOver);
        assert_eq!(dispatch_click(&mut world, a[0], 1).unwrap(), ClickOutcome::Ignored);
        assert!(world.is_alive(a[0]));
    }
}
