//! Text commands read from stdin

pub mod actors;
pub mod session;

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use simulation::{ActorId, Session};

use crate::state::{ConsoleSink, RenderEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Click { id: ActorId, count: u32 },
    Attacking { id: ActorId, on: bool },
    Status,
    Actors,
    Stop,
    Quit,
}

/// Whether the input loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

fn parse_id(word: Option<&str>) -> anyhow::Result<ActorId> {
    let word = word.ok_or_else(|| anyhow!("missing actor id"))?;
    let id = word
        .trim_start_matches('#')
        .parse::<u64>()
        .with_context(|| format!("bad actor id '{}'", word))?;
    Ok(ActorId(id))
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "click" => {
                let id = parse_id(words.next())?;
                let count = match words.next() {
                    Some(n) => n.parse().with_context(|| format!("bad click count '{}'", n))?,
                    None => 1,
                };
                ConsoleCommand::Click { id, count }
            }
            "dclick" => ConsoleCommand::Click {
                id: parse_id(words.next())?,
                count: 2,
            },
            "attacking" => {
                let id = parse_id(words.next())?;
                let on = match words.next() {
                    Some("on") => true,
                    Some("off") => false,
                    other => bail!("expected on|off, got {:?}", other),
                };
                ConsoleCommand::Attacking { id, on }
            }
            "status" => ConsoleCommand::Status,
            "actors" => ConsoleCommand::Actors,
            "stop" => ConsoleCommand::Stop,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command '{}'", other),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument '{}'", extra);
        }
        Ok(command)
    }
}

/// Run one command against the session, reporting results through the sink
pub fn execute(session: &Session, sink: &ConsoleSink, command: ConsoleCommand) -> Flow {
    let result = match command {
        ConsoleCommand::Click { id, count } => actors::click(session, sink, id, count),
        ConsoleCommand::Attacking { id, on } => actors::set_attacking(session, id, on),
        ConsoleCommand::Actors => {
            actors::list(session, sink);
            Ok(())
        }
        ConsoleCommand::Status => {
            session::status(session, sink);
            Ok(())
        }
        ConsoleCommand::Stop => {
            session::stop(session);
            return Flow::Exit;
        }
        ConsoleCommand::Quit => return Flow::Exit,
    };

    if let Err(e) = result {
        sink.emit(&RenderEvent::Error {
            message: e.to_string(),
        });
    }
    Flow::Continue
}
