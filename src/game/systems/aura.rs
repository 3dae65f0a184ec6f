//! Aura maps.
//!
//! Recomputed from scratch every tick and handed to the systems that need
//! them as plain data.

use serde::{Deserialize, Serialize};

use crate::game::entities::EntityKind;
use crate::game::grid::EntityStore;
use crate::game::types::{Position, TraitTag};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuraMaps {
    size: usize,
    pub fire: Vec<bool>,
    pub ice: Vec<bool>,
    pub haunted: Vec<bool>,
    pub ghost: Vec<bool>,
}

/// Which aura layers cover one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAura {
    pub fire: bool,
    pub ice: bool,
    pub haunted: bool,
    pub ghost: bool,
}

impl AuraMaps {
    pub fn compute(store: &EntityStore) -> Self {
        let grid = store.grid();
        let n = grid.cell_count();
        let mut maps = Self {
            size: grid.size(),
            fire: vec![false; n],
            ice: vec![false; n],
            haunted: vec![false; n],
            ghost: vec![false; n],
        };
        for entity in store.iter().filter(|e| store.is_placed(e.id)) {
            match entity.kind {
                EntityKind::TraitTile(tag) => {
                    let layer = match tag {
                        TraitTag::Fire => &mut maps.fire,
                        TraitTag::Ice => &mut maps.ice,
                        TraitTag::Sentient | TraitTag::Haunted => &mut maps.haunted,
                    };
                    let source = entity.anchor;
                    for cell in std::iter::once(source).chain(source.neighbors()) {
                        if let Some(i) = index(maps.size, cell) {
                            layer[i] = true;
                        }
                    }
                }
                EntityKind::Ghost(_) => {
                    for cell in entity.cells() {
                        if let Some(i) = index(maps.size, cell) {
                            maps.ghost[i] = true;
                        }
                    }
                }
                EntityKind::Item(_) => {
                    if entity.is_willful() {
                        for cell in entity.cells() {
                            if let Some(i) = index(maps.size, cell) {
                                maps.haunted[i] = true;
                            }
                        }
                    }
                }
            }
        }
        maps
    }

    pub fn at(&self, pos: Position) -> CellAura {
        match index(self.size, pos) {
            Some(i) if i < self.fire.len() => CellAura {
                fire: self.fire[i],
                ice: self.ice[i],
                haunted: self.haunted[i],
                ghost: self.ghost[i],
            },
            _ => CellAura::default(),
        }
    }
}

fn index(size: usize, pos: Position) -> Option<usize> {
    let side = size as i32;
    (pos.x >= 0 && pos.y >= 0 && pos.x < side && pos.y < side).then(|| (pos.y * side + pos.x) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Entity;
    use crate::game::types::{GhostFlavor, ItemKind, ItemSubtype};

    #[test]
    fn test_tile_aura_is_a_plus_shape() {
        let mut store = EntityStore::new(5);
        store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(0, 0)).unwrap();
        store.spawn(Entity::trait_tile(TraitTag::Ice), Position::new(3, 3)).unwrap();
        let maps = AuraMaps::compute(&store);

        assert_eq!(maps.fire.iter().filter(|b| **b).count(), 3);
        assert!(maps.at(Position::new(1, 0)).fire);
        assert!(!maps.at(Position::new(1, 1)).fire);
        assert_eq!(maps.ice.iter().filter(|b| **b).count(), 5);
        assert!(maps.at(Position::new(3, 4)).ice);
    }

    #[test]
    fn test_haunted_and_ghost_layers_follow_footprints() {
        let mut store = EntityStore::new(5);
        let knife = Entity::item(ItemKind::Sword, ItemSubtype::Knife).with_traits(&[TraitTag::Sentient]);
        store.spawn(knife, Position::new(1, 1)).unwrap();
        store.spawn(Entity::ghost(GhostFlavor::Wisp, 0.0), Position::new(4, 4)).unwrap();
        let maps = AuraMaps::compute(&store);
        assert!(maps.at(Position::new(1, 1)).haunted);
        assert!(maps.at(Position::new(2, 1)).haunted);
        assert!(!maps.at(Position::new(3, 1)).haunted);
        assert!(maps.at(Position::new(4, 4)).ghost);
        assert_eq!(maps.ghost.iter().filter(|b| **b).count(), 1);
        assert_eq!(maps.at(Position::new(-1, 0)), CellAura::default());
    }
}
