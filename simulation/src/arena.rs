//! Arena bounds and separation-checked placement
//!
//! New actors are placed by rejection sampling: draw a uniform position and
//! retry while it sits closer than `min_separation` (Chebyshev) to any live
//! actor of the same kind. The loop is capped; once the cap is hit the best
//! candidate seen so far is used instead.

use rand::Rng;
use tracing::warn;

use crate::components::Position;
use crate::config::SessionConfig;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arena {
    width: u32,
    height: u32,
    actor_width: u32,
    actor_height: u32,
    min_separation: u32,
    retry_cap: u32,
}

/// Result of a placement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    /// False when the retry cap was hit and separation could not be honoured
    pub separated: bool,
    pub attempts: u32,
}

impl Arena {
    pub fn new(
        width: u32,
        height: u32,
        actor_width: u32,
        actor_height: u32,
        min_separation: u32,
        retry_cap: u32,
    ) -> Result<Self, SimError> {
        if width == 0 || height == 0 || actor_width > width || actor_height > height {
            return Err(SimError::ArenaTooSmall {
                width,
                height,
                actor_width,
                actor_height,
            });
        }
        if min_separation == 0 || retry_cap == 0 {
            return Err(SimError::InvalidConfig(
                "min_separation and placement_retry_cap must be positive".into(),
            ));
        }

        Ok(Self {
            width,
            height,
            actor_width,
            actor_height,
            min_separation,
            retry_cap,
        })
    }

    /// Build from config, with bounds reported by the render surface
    pub fn from_config(config: &SessionConfig, bounds: (u32, u32)) -> Result<Self, SimError> {
        Self::new(
            bounds.0,
            bounds.1,
            config.actor_width,
            config.actor_height,
            config.min_separation,
            config.placement_retry_cap,
        )
    }

    pub fn min_separation(&self) -> u32 {
        self.min_separation
    }

    /// Largest valid x (inclusive)
    pub fn max_x(&self) -> u32 {
        self.width - self.actor_width
    }

    /// Largest valid y (inclusive)
    pub fn max_y(&self) -> u32 {
        self.height - self.actor_height
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.x <= self.max_x() && position.y <= self.max_y()
    }

    /// Uniform random position, no separation check
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(0..=self.max_x()), rng.gen_range(0..=self.max_y()))
    }

    /// Find a position at least `min_separation` away from every occupied slot.
    ///
    /// Gives up after `retry_cap` draws and returns the draw that was farthest
    /// from its nearest neighbour.
    pub fn place_new<R: Rng + ?Sized>(&self, rng: &mut R, occupied: &[Position]) -> Placement {
        let mut best: Option<(Position, u32)> = None;

        for attempt in 1..=self.retry_cap {
            let candidate = self.random_position(rng);
            let nearest = occupied
                .iter()
                .map(|other| candidate.chebyshev(other))
                .min()
                .unwrap_or(u32::MAX);

            if nearest >= self.min_separation {
                return Placement {
                    position: candidate,
                    separated: true,
                    attempts: attempt,
                };
            }

            if best.map_or(true, |(_, d)| nearest > d) {
                best = Some((candidate, nearest));
            }
        }

        // retry_cap >= 1, so at least one candidate was drawn
        let (position, nearest) = best.unwrap_or((Position::new(0, 0), 0));
        warn!(
            "Placement gave up after {} attempts ({} occupied), nearest neighbour at {}",
            self.retry_cap,
            occupied.len(),
            nearest
        );
        Placement {
            position,
            separated: false,
            attempts: self.retry_cap,
        }
    }
}
