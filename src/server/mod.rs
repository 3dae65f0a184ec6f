//! Session layer.
//!
//! - `game_session`: the actor that owns a run and ticks it on a timer
//! - `terminal`: a snapshot subscriber printing to stdout, plus input parsing

pub mod game_session;
pub mod terminal;
