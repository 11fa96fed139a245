//! Error type shared by every fallible operation in the simulation crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::components::ActorId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("arena {width}x{height} cannot hold a {actor_width}x{actor_height} actor")]
    ArenaTooSmall {
        width: u32,
        height: u32,
        actor_width: u32,
        actor_height: u32,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("actor {0} is not an attack actor")]
    NotAnAttacker(ActorId),

    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(#[from] io::Error),

    #[error("session already finished")]
    SessionFinished,
}
