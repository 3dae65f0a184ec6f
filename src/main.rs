//! Terminal demo for the Garena grid engine.
//!
//! Starts a `GameSession` actor, subscribes a `TerminalView` to its snapshots
//! and forwards keyboard commands read from stdin. An optional JSON config path
//! may be given as the first argument.

use std::io;
use std::path::Path;

use actix::prelude::*;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use garena_grid::config::EngineConfig;
use garena_grid::server::game_session::messages::{GetSnapshot, ResetSession, SubmitIntent, Subscribe};
use garena_grid::server::game_session::GameSession;
use garena_grid::server::terminal::{parse_command, Command, TerminalView, HELP};

fn load_config() -> io::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = EngineConfig::load(Path::new(&path)).map_err(io::Error::other)?;
            info!("[Main] Loaded config from {}", path);
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[actix::main]
async fn main() -> io::Result<()> {
    // Initialize logger from environment variable.
    env_logger::init();

    let config = load_config()?;
    let session = GameSession::new(config).start();
    let view = TerminalView { clear: true }.start();
    session.do_send(Subscribe(view.recipient()));

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Some(Command::Intent(intent)) => session.do_send(SubmitIntent { intent }),
            Some(Command::Reset) => session.do_send(ResetSession::default()),
            Some(Command::Dump) => match session.send(GetSnapshot).await {
                Ok(snapshot) => match snapshot.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(err) => warn!("[Main] Snapshot serialization failed: {}", err),
                },
                Err(err) => warn!("[Main] Session unreachable: {}", err),
            },
            Some(Command::Quit) => break,
            None => println!("{}", HELP),
        }
    }

    System::current().stop();
    Ok(())
}
