pub mod entities;
pub mod error;
pub mod grid;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod types;

pub use error::ActionError;
pub use snapshot::Snapshot;
pub use state::{GameState, Intent, LossReason, Phase};
