//! Garena grid simulation engine.
//!
//! A fixed-step, single-threaded simulation of a small grid where the player
//! spawns, shoves and delivers items under hazard pressure, driven by an actix
//! session actor.

pub mod config;
pub mod game;
pub mod server;
