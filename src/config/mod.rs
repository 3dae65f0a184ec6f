/// Main configuration module.
///
/// Compile-time defaults live in `game`, `capacity` and `progression`;
/// `engine` bundles them into an overridable [`EngineConfig`].
pub mod capacity;
pub mod engine;
pub mod game;
pub mod progression;

pub use engine::{ConfigError, EconomyConfig, EngineConfig, HazardConfig};
pub use progression::{default_stages, StageSpec};
