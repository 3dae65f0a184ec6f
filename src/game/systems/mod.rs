pub mod aura;
pub mod capacity;
pub mod ghost;
pub mod movement;
pub mod orders;
pub mod render;
pub mod sentient;
pub mod traits;

pub use movement::{move_entity, plan_move, slide, try_move, MovePlan, MoveRules};
pub use render::print_snapshot;
