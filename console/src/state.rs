use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use simulation::{
    ActorId, ActorKind, ActorSnapshot, ClickOutcome, Position, RenderSink, SessionStatus,
};
use tracing::warn;

// -- Events written to stdout, one JSON object per line --

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent {
    Actor {
        id: u64,
        kind: ActorKind,
        label: String,
        x: u32,
        y: u32,
    },
    Visibility {
        id: u64,
        visible: bool,
    },
    Health {
        value: i32,
    },
    Kills {
        value: u32,
    },
    Terminal {
        message: String,
    },
    Click {
        id: u64,
        outcome: ClickOutcome,
    },
    Status(SessionStatus),
    Actors {
        actors: Vec<ActorSnapshot>,
    },
    Error {
        message: String,
    },
}

/// Render sink for a terminal: every update becomes a JSON line on stdout
pub struct ConsoleSink {
    bounds: (u32, u32),
    terminated: AtomicBool,
    hidden: Mutex<HashSet<u64>>,
}

impl ConsoleSink {
    pub fn new(bounds: (u32, u32)) -> Self {
        Self {
            bounds,
            terminated: AtomicBool::new(false),
            hidden: Mutex::new(HashSet::new()),
        }
    }

    /// Event for an actor update, or `None` once the actor has been hidden
    fn actor_event(&self, id: ActorId, kind: ActorKind, position: Position) -> Option<RenderEvent> {
        let hidden = self.hidden.lock().unwrap_or_else(|e| e.into_inner());
        if hidden.contains(&id.0) {
            return None;
        }
        Some(RenderEvent::Actor {
            id: id.0,
            kind,
            label: kind.label().to_string(),
            x: position.x,
            y: position.y,
        })
    }

    pub fn emit(&self, event: &RenderEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize event {:?}: {}", event, e);
                return;
            }
        };

        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", line).and_then(|_| out.flush());
    }

    /// The session asked to be closed
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}

impl RenderSink for ConsoleSink {
    fn report_bounds(&self) -> (u32, u32) {
        self.bounds
    }

    fn upsert_actor(&self, id: ActorId, kind: ActorKind, position: Position) {
        if let Some(event) = self.actor_event(id, kind, position) {
            self.emit(&event);
        }
    }

    fn set_visible(&self, id: ActorId, visible: bool) {
        {
            let mut hidden = self.hidden.lock().unwrap_or_else(|e| e.into_inner());
            if visible {
                hidden.remove(&id.0);
            } else {
                hidden.insert(id.0);
            }
        }
        self.emit(&RenderEvent::Visibility { id: id.0, visible });
    }

    fn set_health_display(&self, health: i32) {
        self.emit(&RenderEvent::Health { value: health });
    }

    fn set_kill_count_display(&self, kills: u32) {
        self.emit(&RenderEvent::Kills { value: kills });
    }

    fn show_terminal_message(&self, text: &str) {
        self.emit(&RenderEvent::Terminal {
            message: text.to_string(),
        });
    }

    fn terminate_session(&self) {
        self.terminated.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_tagged() {
        let json = serde_json::to_value(RenderEvent::Health { value: 80 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "health", "value": 80 }));

        let json = serde_json::to_value(RenderEvent::Actor {
            id: 3,
            kind: ActorKind::Defense,
            label: ActorKind::Defense.label().to_string(),
            x: 10,
            y: 20,
        })
        .unwrap();
        assert_eq!(json["event"], "actor");
        assert_eq!(json["kind"], "defense");
        assert_eq!(json["x"], 10);
    }

    #[test]
    fn test_click_event_nests_outcome() {
        let json = serde_json::to_value(RenderEvent::Click {
            id: 4,
            outcome: ClickOutcome::Ignored,
        })
        .unwrap();
        assert_eq!(json["event"], "click");
        assert_eq!(json["outcome"]["result"], "ignored");
    }

    #[test]
    fn test_terminate_sets_flag() {
        let sink = ConsoleSink::new((500, 500));
        assert!(!sink.is_terminated());
        sink.terminate_session();
        assert!(sink.is_terminated());
        assert_eq!(sink.report_bounds(), (500, 500));
    }

    #[test]
    fn test_late_move_after_hide_is_dropped() {
        let sink = ConsoleSink::new((500, 500));
        let id = ActorId(7);
        let at = Position::new(40, 60);

        assert!(sink.actor_event(id, ActorKind::Attack, at).is_some());

        // Actor died between its move and the publish
        sink.set_visible(id, false);
        assert_eq!(sink.actor_event(id, ActorKind::Attack, at), None);
        assert!(sink.actor_event(ActorId(8), ActorKind::Attack, at).is_some());

        sink.set_visible(id, true);
        assert!(sink.actor_event(id, ActorKind::Attack, at).is_some());
    }
}
