//! Monster Arena console
//!
//! Runs one session headless. Render updates go to stdout as JSON lines,
//! logs go to stderr, and commands are read from stdin.

mod commands;
mod state;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use simulation::{GameVariant, Session, SessionConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{ConsoleCommand, Flow};
use state::{ConsoleSink, RenderEvent};

const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Classic,
    Paced,
}

impl From<VariantArg> for GameVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Classic => GameVariant::Classic,
            VariantArg::Paced => GameVariant::Paced,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "arena-console", about = "Play the monster arena from a terminal")]
struct Args {
    /// Built-in rule set, ignored when --config is given
    #[arg(long, value_enum, default_value_t = VariantArg::Classic)]
    variant: VariantArg,

    /// JSON session config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the arena width
    #[arg(long)]
    width: Option<u32>,

    /// Override the arena height
    #[arg(long)]
    height: Option<u32>,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// Forward stdin lines to the main loop
fn spawn_stdin_reader() -> anyhow::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to start stdin reader")?;
    Ok(rx)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::preset(args.variant.into()),
    };
    if let Some(width) = args.width {
        config.arena_width = width;
    }
    if let Some(height) = args.height {
        config.arena_height = height;
    }

    let sink = Arc::new(ConsoleSink::new((config.arena_width, config.arena_height)));
    let session = Session::start(config, sink.clone()).context("failed to start session")?;
    let input = spawn_stdin_reader()?;

    while !sink.is_terminated() {
        let line = match input.recv_timeout(INPUT_POLL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let flow = match line.parse::<ConsoleCommand>() {
            Ok(command) => commands::execute(&session, &sink, command),
            Err(e) => {
                sink.emit(&RenderEvent::Error {
                    message: e.to_string(),
                });
                Flow::Continue
            }
        };
        if flow == Flow::Exit {
            break;
        }
    }

    let status = session.status();
    info!(
        "Session over: outcome {:?}, {} kills of {}, health {}",
        status.outcome, status.kills, status.total_spawned, status.health
    );
    sink.emit(&RenderEvent::Status(status));
    session.shutdown();

    Ok(())
}
