//! Entity store.
//!
//! Owns every live entity in an arena keyed by [`EntityId`] and keeps the
//! [`Grid`] index in sync with each entity's `(anchor, size)` footprint.
//! Creation and destruction update the grid in the same call, so no cell can
//! reference a destroyed entity.
//!
//! Mutable access to stored entities stays inside the crate: outside callers
//! can only move an entity through [`EntityStore::remove`] and
//! [`EntityStore::place`], which keep the grid in step.
//!
//! ```compile_fail
//! use garena_grid::game::entities::Entity;
//! use garena_grid::game::grid::EntityStore;
//! use garena_grid::game::types::{ItemKind, ItemSubtype, Position};
//!
//! let mut store = EntityStore::new(10);
//! let id = store.spawn(Entity::item(ItemKind::Bread, ItemSubtype::Bread), Position::new(0, 9)).unwrap();
//! store.get_mut(id).unwrap().anchor = Position::new(7, 7);
//! ```
//!
//! ```compile_fail
//! use garena_grid::config::EngineConfig;
//! use garena_grid::game::GameState;
//!
//! let mut state = GameState::new(EngineConfig::default());
//! let _ = state.store_mut();
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::error;

use crate::game::entities::{Entity, EntityId};
use crate::game::error::{InvariantViolation, PlaceError};
use crate::game::grid::Grid;
use crate::game::types::{Position, Size};

#[derive(Debug, Clone)]
pub struct EntityStore {
    grid: Grid,
    entities: BTreeMap<EntityId, Entity>,
    placed: BTreeSet<EntityId>,
    next_id: u64,
}

impl EntityStore {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid: Grid::new(grid_size),
            entities: BTreeMap::new(),
            placed: BTreeSet::new(),
            next_id: 1,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Entity occupying `cell`, if any.
    pub fn at(&self, cell: Position) -> Option<&Entity> {
        self.grid.get(cell).and_then(|id| self.entities.get(&id))
    }

    pub fn id_at(&self, cell: Position) -> Option<EntityId> {
        self.grid.get(cell)
    }

    /// `true` when every covered cell is in bounds and empty.
    pub fn can_place(&self, anchor: Position, size: Size) -> bool {
        size.cells(anchor).all(|c| self.grid.is_free(c))
    }

    fn check_footprint(&self, anchor: Position, size: Size) -> Result<(), PlaceError> {
        if !self.grid.footprint_in_bounds(anchor, size) {
            return Err(PlaceError::OutOfBounds { anchor, size });
        }
        match size.cells(anchor).find_map(|c| self.grid.get(c).map(|by| (c, by))) {
            Some((cell, by)) => Err(PlaceError::Occupied { cell, by }),
            None => Ok(()),
        }
    }

    /// Assigns an id to `entity` and places it at `anchor`. On error nothing
    /// is stored.
    pub fn spawn(&mut self, mut entity: Entity, anchor: Position) -> Result<EntityId, PlaceError> {
        self.check_footprint(anchor, entity.size)?;
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        if let Err(err) = self.place(id, anchor) {
            self.entities.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Writes `id` into every cell of its footprint anchored at `anchor`.
    pub fn place(&mut self, id: EntityId, anchor: Position) -> Result<(), PlaceError> {
        let size = match self.entities.get(&id) {
            Some(e) => e.size,
            None => return Err(PlaceError::UnknownEntity(id)),
        };
        if self.placed.contains(&id) {
            debug_assert!(false, "entity {id} placed twice");
            error!("[Store] Refusing to place {} twice", id);
            return Err(PlaceError::AlreadyPlaced(id));
        }
        self.check_footprint(anchor, size)?;
        for cell in size.cells(anchor) {
            self.grid.set(cell, id);
        }
        if let Some(e) = self.entities.get_mut(&id) {
            e.anchor = anchor;
        }
        self.placed.insert(id);
        Ok(())
    }

    /// Lifts `id` off the grid, keeping it in the arena. Only cells still
    /// pointing at `id` are cleared.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get(&id) else {
            return false;
        };
        for cell in entity.cells() {
            self.grid.clear_if(cell, id);
        }
        self.placed.remove(&id)
    }

    /// Removes `id` from the grid and the arena.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.remove(id);
        self.entities.remove(&id)
    }

    pub fn is_placed(&self, id: EntityId) -> bool {
        self.placed.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Ids of entities matching `pred`, in id order.
    pub fn ids_where(&self, pred: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities.values().filter(|e| pred(e)).map(|e| e.id).collect()
    }

    /// Total traits carried by items (tiles and ghosts excluded).
    pub fn item_trait_count(&self) -> usize {
        self.entities.values().filter(|e| e.is_item()).map(|e| e.traits.len()).sum()
    }

    /// Checks that grid cells and footprints agree exactly.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        for id in &self.placed {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            for cell in entity.cells() {
                if self.grid.get(cell) != Some(*id) {
                    return Err(InvariantViolation::Uncovered { id: *id, cell });
                }
            }
        }
        for cell in self.grid.positions() {
            let Some(id) = self.grid.get(cell) else {
                continue;
            };
            match self.entities.get(&id) {
                None => return Err(InvariantViolation::Dangling { cell, id }),
                Some(e) if !e.covers(cell) || !self.placed.contains(&id) => {
                    return Err(InvariantViolation::Stray { cell, id });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{ItemKind, ItemSubtype, TraitTag};

    fn knife() -> Entity {
        Entity::item(ItemKind::Sword, ItemSubtype::Knife)
    }

    #[test]
    fn test_knife_can_place_respects_bounds() {
        let store = EntityStore::new(10);
        assert!(store.can_place(Position::new(0, 0), Size::WIDE));
        assert!(!store.can_place(Position::new(9, 0), Size::WIDE));
    }

    #[test]
    fn test_spawn_writes_every_covered_cell() {
        let mut store = EntityStore::new(10);
        let id = store.spawn(knife(), Position::new(3, 3)).unwrap();
        assert_eq!(store.id_at(Position::new(3, 3)), Some(id));
        assert_eq!(store.id_at(Position::new(4, 3)), Some(id));
        assert_eq!(store.id_at(Position::new(5, 3)), None);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_spawn_on_occupied_cell_stores_nothing() {
        let mut store = EntityStore::new(10);
        let first = store.spawn(knife(), Position::new(3, 3)).unwrap();
        let err = store
            .spawn(Entity::trait_tile(TraitTag::Fire), Position::new(4, 3))
            .unwrap_err();
        assert_eq!(err, PlaceError::Occupied { cell: Position::new(4, 3), by: first });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_despawn_clears_grid() {
        let mut store = EntityStore::new(10);
        let id = store.spawn(knife(), Position::new(0, 0)).unwrap();
        assert!(store.despawn(id).is_some());
        assert_eq!(store.grid().occupied_count(), 0);
        assert!(store.at(Position::new(0, 0)).is_none());
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_remove_then_place_relocates() {
        let mut store = EntityStore::new(10);
        let id = store.spawn(knife(), Position::new(0, 0)).unwrap();
        assert!(store.remove(id));
        assert!(!store.is_placed(id));
        store.place(id, Position::new(5, 5)).unwrap();
        assert_eq!(store.get(id).unwrap().anchor, Position::new(5, 5));
        assert!(store.grid().is_free(Position::new(0, 0)));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_relocation_through_public_calls_keeps_index_in_step() {
        let mut store = EntityStore::new(10);
        let id = store.spawn(Entity::item(ItemKind::Bread, ItemSubtype::Bread), Position::new(0, 9)).unwrap();
        store.spawn(knife(), Position::new(7, 7)).unwrap();

        assert!(store.remove(id));
        assert!(store.place(id, Position::new(7, 7)).is_err());
        assert!(!store.is_placed(id));
        store.place(id, Position::new(1, 1)).unwrap();
        assert_eq!(store.id_at(Position::new(1, 1)), Some(id));
        assert!(store.grid().is_free(Position::new(0, 9)));
        assert!(store.verify().is_ok());
    }
}
