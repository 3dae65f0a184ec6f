//! Game entities module.
//!
//! This module organizes the entity model and the spawning helpers.

pub mod entity;
pub mod spawn;

pub use entity::*;
pub use spawn::*;
