//! ECS components for arena actors

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Drains player health; dies on any click
    Attack,
    /// Harmless; dies only on a double-click
    Defense,
}

impl ActorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActorKind::Attack => "(╬ಠ益ಠ)",
            ActorKind::Defense => "(ಠ_ಠ)",
        }
    }
}

// ============================================================================
// Spatial Components
// ============================================================================

/// Top-left corner of an actor, in arena pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Largest per-axis distance between two positions
    pub fn chebyshev(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

// ============================================================================
// Lifecycle Components
// ============================================================================

/// Marker: actor is alive
#[derive(Debug, Clone, Copy, Default)]
pub struct Alive;

/// Replaces `Alive` once an actor is killed. Never removed again.
#[derive(Debug, Clone, Copy)]
pub struct Dead {
    /// Kill counter value right after this death
    pub kill_order: u32,
}

/// Attack-only state
#[derive(Debug, Clone, Copy)]
pub struct Attacker {
    pub attacking: bool,
}

impl Default for Attacker {
    fn default() -> Self {
        Self { attacking: true }
    }
}

// ============================================================================
// Snapshots handed out of the lock
// ============================================================================

/// Self-consistent copy of one actor, safe to pass to a render sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Position,
    pub alive: bool,
}

// ============================================================================
// Session Counters
// ============================================================================

/// Number of kills of either kind. Only ever goes up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KillCounter(u32);

impl KillCounter {
    pub fn record(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    GameOver,
    Cleared,
}

impl SessionOutcome {
    /// Text shown to the player when the session ends this way
    pub fn message(&self) -> &'static str {
        match self {
            SessionOutcome::GameOver => "Game Over!",
            SessionOutcome::Cleared => "Clear!",
        }
    }
}
