use simulation::{ActorId, Session};

use crate::state::{ConsoleSink, RenderEvent};

pub fn click(session: &Session, sink: &ConsoleSink, id: ActorId, count: u32) -> anyhow::Result<()> {
    let outcome = session.on_click(id, count)?;
    sink.emit(&RenderEvent::Click { id: id.0, outcome });
    Ok(())
}

pub fn set_attacking(session: &Session, id: ActorId, on: bool) -> anyhow::Result<()> {
    session.set_attacking(id, on)?;
    Ok(())
}

pub fn list(session: &Session, sink: &ConsoleSink) {
    sink.emit(&RenderEvent::Actors {
        actors: session.actors(),
    });
}
