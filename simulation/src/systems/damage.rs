//! Damage System
//!
//! Attack actors hit the player for `base_damage * alive_attackers`, so the
//! survivors hit harder as their numbers shrink.

/// Player health. Only ever goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    health: i32,
}

/// What a single hit did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    pub damage: i32,
    pub health: i32,
    /// True only for the hit that took health from above zero to zero or below
    pub defeated: bool,
}

impl Player {
    pub fn new(health: i32) -> Self {
        Self { health }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, damage: i32) -> HealthChange {
        let before = self.health;
        self.health = before.saturating_sub(damage.max(0));
        HealthChange {
            damage: before - self.health,
            health: self.health,
            defeated: before > 0 && self.health <= 0,
        }
    }
}

/// Shared attack scaling. Sole owner of the alive attacker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageModel {
    base_damage: i32,
    alive_attackers: u32,
    current_damage: i32,
}

impl DamageModel {
    pub fn new(base_damage: i32) -> Self {
        Self {
            base_damage,
            alive_attackers: 0,
            current_damage: 0,
        }
    }

    pub fn base_damage(&self) -> i32 {
        self.base_damage
    }

    pub fn alive_attackers(&self) -> u32 {
        self.alive_attackers
    }

    /// Damage one attacker deals per tick right now
    pub fn current_damage(&self) -> i32 {
        self.current_damage
    }

    /// A new attack actor joined the arena
    pub fn on_attack_spawn(&mut self) {
        self.alive_attackers += 1;
        self.rescale();
    }

    /// An attack actor died. Called exactly once per attacker death.
    pub fn on_attack_death(&mut self) {
        self.alive_attackers = self.alive_attackers.saturating_sub(1);
        self.rescale();
    }

    /// One attacker hits the player with the current scaled damage
    pub fn on_attack_tick(&self, player: &mut Player) -> HealthChange {
        player.take_damage(self.current_damage)
    }

    fn rescale(&mut self) {
        let count = i32::try_from(self.alive_attackers).unwrap_or(i32::MAX);
        self.current_damage = self.base_damage.saturating_mul(count);
    }
}
