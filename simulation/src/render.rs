//! Render sink - the drawing surface the session reports to
//!
//! Implementations receive copies only. The arena lock is never held while
//! a sink method runs.

use crate::components::{ActorId, ActorKind, Position, SessionOutcome};

pub trait RenderSink: Send + Sync {
    /// Drawable area as (width, height)
    fn report_bounds(&self) -> (u32, u32);

    /// Draw or move an actor. Never makes a hidden actor visible again: a
    /// worker may publish a move for an actor that died after the move was
    /// taken, and that update must be dropped.
    fn upsert_actor(&self, id: ActorId, kind: ActorKind, position: Position);

    fn set_visible(&self, id: ActorId, visible: bool);

    fn set_health_display(&self, health: i32);

    fn set_kill_count_display(&self, kills: u32);

    fn show_terminal_message(&self, text: &str);

    fn terminate_session(&self);
}

/// Tell the player how the session ended, then close it
pub fn announce_outcome(sink: &dyn RenderSink, outcome: SessionOutcome) {
    sink.show_terminal_message(outcome.message());
    sink.terminate_session();
}
