//! Monster Arena Simulation Engine
//!
//! Attack and defense actors share a bounded arena. Each actor is driven by
//! its own background thread, an optional coordinator paces new spawns, and
//! the player removes actors by clicking them. All shared state sits behind
//! one lock; renderers only ever see copies.

pub mod arena;
pub mod components;
pub mod config;
pub mod error;
pub mod render;
pub mod runners;
pub mod session;
pub mod systems;
pub mod world;

pub use arena::{Arena, Placement};
pub use components::*;
pub use config::{GameVariant, SessionConfig};
pub use error::SimError;
pub use render::RenderSink;
pub use runners::CoordinatorState;
pub use session::{Session, SessionStatus};
pub use systems::ClickOutcome;
pub use world::ArenaWorld;
