//! Error types of the simulation core.
//!
//! Gameplay errors are recoverable and leave the state untouched; their
//! `Display` text doubles as the status line shown to the player.

use thiserror::Error;

use crate::game::entities::EntityId;
use crate::game::types::{Position, Size};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceError {
    #[error("footprint {size:?} at {anchor:?} leaves the grid")]
    OutOfBounds { anchor: Position, size: Size },
    #[error("cell {cell:?} is held by {by}")]
    Occupied { cell: Position, by: EntityId },
    #[error("entity {0} is already placed")]
    AlreadyPlaced(EntityId),
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// Why a chain move was refused. A refused move has no side effects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveError {
    #[error("{0} would leave the grid")]
    OutOfBounds(EntityId),
    #[error("{mover} is not immune to tile {tile}")]
    TileInTheWay { mover: EntityId, tile: EntityId },
    #[error("ghost {ghost} cannot be pushed")]
    GhostInTheWay { ghost: EntityId },
    #[error("{mover} may not push {blocker}")]
    PushDenied { mover: EntityId, blocker: EntityId },
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// A broken grid/store invariant found by `EntityStore::verify`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("{id} covers {cell:?} but the cell points elsewhere")]
    Uncovered { id: EntityId, cell: Position },
    #[error("cell {cell:?} points at missing entity {id}")]
    Dangling { cell: Position, id: EntityId },
    #[error("cell {cell:?} points at {id} outside its footprint")]
    Stray { cell: Position, id: EntityId },
}

/// Refusal of a player intent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("BLOCKED")]
    Blocked,
    #[error("SPAWN BLOCKED")]
    SpawnBlocked,
    #[error("NOTHING SELECTED")]
    NothingSelected,
    #[error("NOT MOVABLE")]
    NotMovable,
    #[error("NOT DELIVERY")]
    NotDeliveryZone,
    #[error("CANNOT DELIVER THAT")]
    NotDeliverable,
    #[error("NO ORDER")]
    NoOrder,
    #[error("NOTHING TO USE")]
    NotUsable,
    #[error("COOLDOWN {0:.1}s")]
    OnCooldown(f32),
    #[error("NO ENERGY (need {needed:.0}, have {available:.0})")]
    InsufficientEnergy { needed: f32, available: f32 },
    #[error("GAME OVER")]
    GameOver,
}
