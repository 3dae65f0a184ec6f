//! Terminal front end: a subscriber actor that prints snapshots, and the
//! keyboard command parser used by the demo binary.

use actix::prelude::*;
use log::debug;

use crate::game::state::Intent;
use crate::game::systems::render::print_snapshot;
use crate::game::types::{Direction, Position};
use crate::server::game_session::messages::SnapshotUpdate;

/// Prints every snapshot it receives.
pub struct TerminalView {
    /// Clear the screen before each frame.
    pub clear: bool,
}

impl Actor for TerminalView {
    type Context = Context<Self>;
}

impl Handler<SnapshotUpdate> for TerminalView {
    type Result = ();

    fn handle(&mut self, msg: SnapshotUpdate, _: &mut Context<Self>) -> Self::Result {
        debug!("[TerminalView] Frame for session {} tick {}", msg.session_id, msg.snapshot.tick);
        if self.clear {
            print!("\x1B[2J\x1B[H");
        }
        print_snapshot(&msg.snapshot);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Reset,
    Dump,
    Quit,
}

pub const HELP: &str = "w/a/s/d select | i/j/k/l shove | e spawn/submit | u use | g X Y jump | r reset | p dump json | q quit";

/// Parse one input line. Returns `None` for anything unrecognised.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let head = words.next()?.to_ascii_lowercase();
    let intent = match head.as_str() {
        "w" => Intent::MoveSelector(Direction::Up),
        "a" => Intent::MoveSelector(Direction::Left),
        "s" => Intent::MoveSelector(Direction::Down),
        "d" => Intent::MoveSelector(Direction::Right),
        "i" => Intent::Shove(Direction::Up),
        "j" => Intent::Shove(Direction::Left),
        "k" => Intent::Shove(Direction::Down),
        "l" => Intent::Shove(Direction::Right),
        "e" => Intent::SpawnOrSubmit,
        "u" => Intent::UseSelected,
        "g" => {
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            Intent::SelectCell(Position::new(x, y))
        }
        "r" => return Some(Command::Reset),
        "p" => return Some(Command::Dump),
        "q" | "quit" => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::Intent(intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_command("w"), Some(Command::Intent(Intent::MoveSelector(Direction::Up))));
        assert_eq!(parse_command(" L "), Some(Command::Intent(Intent::Shove(Direction::Right))));
        assert_eq!(parse_command("g 3 7"), Some(Command::Intent(Intent::SelectCell(Position::new(3, 7)))));
        assert_eq!(parse_command("q"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("z"), None);
        assert_eq!(parse_command("g 3"), None);
        assert_eq!(parse_command("g x y"), None);
    }
}
