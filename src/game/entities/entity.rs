//! Entity model.
//!
//! An [`Entity`] is the only mutable simulation object. Its coverage on the
//! grid is always recomputed from `(anchor, size)`; entities never hold
//! pointers back to the cells they occupy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::game::FIRE_DURATION;
use crate::game::types::{GhostFlavor, ItemKind, ItemSubtype, Position, Size, TraitSet, TraitTag};

/// Stable identity of an entity for its whole lifetime within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-ghost autonomous state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostState {
    pub flavor: GhostFlavor,
    /// Seconds left before the ghost may act after spawning.
    pub grace: f32,
    /// Seconds accumulated toward the next step.
    pub step_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Item(ItemKind),
    Ghost(GhostState),
    /// Immovable 1×1 tile granting its trait to items dwelling next to it.
    TraitTile(TraitTag),
}

/// Dwell timer toward absorbing one specific adjacent tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorbTimer {
    pub tile: EntityId,
    pub elapsed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub subtype: ItemSubtype,
    pub traits: TraitSet,
    pub anchor: Position,
    pub size: Size,
    pub fire_timer: f32,
    pub active_cooldown: f32,
    pub absorb: Option<AbsorbTimer>,
}

impl Entity {
    fn with_kind(kind: EntityKind, subtype: ItemSubtype) -> Self {
        Self {
            // Assigned by the store on spawn.
            id: EntityId(0),
            kind,
            subtype,
            traits: TraitSet::empty(),
            anchor: Position::new(0, 0),
            size: subtype.default_size(),
            fire_timer: 0.0,
            active_cooldown: 0.0,
            absorb: None,
        }
    }

    pub fn item(kind: ItemKind, subtype: ItemSubtype) -> Self {
        Self::with_kind(EntityKind::Item(kind), subtype)
    }

    pub fn ghost(flavor: GhostFlavor, grace: f32) -> Self {
        Self::with_kind(
            EntityKind::Ghost(GhostState { flavor, grace, step_timer: 0.0 }),
            ItemSubtype::Ghost,
        )
    }

    pub fn trait_tile(tag: TraitTag) -> Self {
        Self::with_kind(EntityKind::TraitTile(tag), ItemSubtype::TraitTile)
    }

    pub fn with_traits(mut self, tags: &[TraitTag]) -> Self {
        for tag in tags {
            self.apply_trait(*tag);
        }
        self
    }

    pub fn is_item(&self) -> bool {
        matches!(self.kind, EntityKind::Item(_))
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.kind, EntityKind::Ghost(_))
    }

    pub fn is_tile(&self) -> bool {
        matches!(self.kind, EntityKind::TraitTile(_))
    }

    pub fn item_kind(&self) -> Option<ItemKind> {
        match self.kind {
            EntityKind::Item(kind) => Some(kind),
            EntityKind::Ghost(_) | EntityKind::TraitTile(_) => None,
        }
    }

    pub fn tile_trait(&self) -> Option<TraitTag> {
        match self.kind {
            EntityKind::TraitTile(tag) => Some(tag),
            EntityKind::Item(_) | EntityKind::Ghost(_) => None,
        }
    }

    pub fn ghost_state(&self) -> Option<&GhostState> {
        match &self.kind {
            EntityKind::Ghost(state) => Some(state),
            EntityKind::Item(_) | EntityKind::TraitTile(_) => None,
        }
    }

    pub fn ghost_state_mut(&mut self) -> Option<&mut GhostState> {
        match &mut self.kind {
            EntityKind::Ghost(state) => Some(state),
            EntityKind::Item(_) | EntityKind::TraitTile(_) => None,
        }
    }

    pub fn has(&self, tag: TraitTag) -> bool {
        self.traits.contains(tag)
    }

    /// Sentient and haunted items wander on their own and fight player input.
    pub fn is_willful(&self) -> bool {
        self.has(TraitTag::Sentient) || self.has(TraitTag::Haunted)
    }

    /// Adds `tag`, dropping its opposite element. Fire always restarts its timer.
    /// Returns `true` if the trait was not held before.
    pub fn apply_trait(&mut self, tag: TraitTag) -> bool {
        if let Some(opposite) = tag.opposite() {
            self.remove_trait(opposite);
        }
        if tag == TraitTag::Fire {
            self.fire_timer = FIRE_DURATION;
        }
        self.traits.insert(tag)
    }

    pub fn remove_trait(&mut self, tag: TraitTag) -> bool {
        if tag == TraitTag::Fire {
            self.fire_timer = 0.0;
        }
        self.traits.remove(tag)
    }

    /// Burns down the fire timer. Returns `true` when Fire went out this call.
    pub fn tick_fire(&mut self, dt: f32) -> bool {
        if !self.has(TraitTag::Fire) {
            return false;
        }
        self.fire_timer -= dt;
        if self.fire_timer <= 0.0 {
            self.remove_trait(TraitTag::Fire);
            return true;
        }
        false
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> {
        self.size.cells(self.anchor)
    }

    pub fn covers(&self, pos: Position) -> bool {
        pos.x >= self.anchor.x
            && pos.x < self.anchor.x + self.size.w
            && pos.y >= self.anchor.y
            && pos.y < self.anchor.y + self.size.h
    }

    /// Cells orthogonally adjacent to the footprint, excluding the footprint
    /// itself. May include out-of-bounds coordinates.
    pub fn border_cells(&self) -> Vec<Position> {
        let mut border = Vec::new();
        for cell in self.cells() {
            for n in cell.neighbors() {
                if !self.covers(n) && !border.contains(&n) {
                    border.push(n);
                }
            }
        }
        border
    }

    /// Footprint cell closest to `target` (Manhattan).
    pub fn nearest_cell_to(&self, target: Position) -> Position {
        self.cells().min_by_key(|c| c.manhattan(target)).unwrap_or(self.anchor)
    }
}
