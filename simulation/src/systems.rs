//! Systems - state transitions applied to the arena world under its lock

pub mod click;
pub mod damage;

pub use click::{dispatch_click, ClickOutcome};
pub use damage::{DamageModel, HealthChange, Player};
