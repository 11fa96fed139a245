use simulation::Session;
use tracing::info;

use crate::state::{ConsoleSink, RenderEvent};

pub fn status(session: &Session, sink: &ConsoleSink) {
    sink.emit(&RenderEvent::Status(session.status()));
}

pub fn stop(session: &Session) {
    info!("Stop requested from console");
    session.on_session_stop_requested();
}
