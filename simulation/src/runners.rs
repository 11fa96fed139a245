//! Background runners - threads that drive the arena between clicks

pub mod movement;
pub mod shared;
pub mod spawn;

pub use movement::{MovementWorker, WorkerPlan};
pub use shared::SharedArena;
pub use spawn::{CoordinatorState, SpawnCoordinator, SpawnSettings};
