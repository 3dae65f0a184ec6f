//! Grid index and the entity store built on top of it.

pub mod grid;
pub mod store;

pub use grid::Grid;
pub use store::EntityStore;
