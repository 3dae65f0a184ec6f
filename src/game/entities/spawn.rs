//! Spawning helpers: random cell picking, ghosts, trait tiles, delivery
//! zones and the item conveyor.

use std::collections::VecDeque;

use log::{debug, warn};
use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};
use serde::{Deserialize, Serialize};

use crate::config::game::{CONVEYOR_LEN, PLAIN_BOX_CHANCE};
use crate::game::entities::{Entity, EntityId};
use crate::game::grid::EntityStore;
use crate::game::types::{GhostFlavor, ItemKind, ItemSubtype, Position, Size, TraitTag};

/// Pick a random anchor where `size` fits on free cells, none of which is in `excluded`.
pub fn random_free_anchor<R: Rng + ?Sized>(
    store: &EntityStore,
    rng: &mut R,
    size: Size,
    excluded: &[Position],
) -> Option<Position> {
    store
        .grid()
        .positions()
        .filter(|p| store.can_place(*p, size) && size.cells(*p).all(|c| !excluded.contains(&c)))
        .choose(rng)
}

/// Spawn a ghost on a random free, non-delivery cell.
pub fn spawn_ghost<R: Rng + ?Sized>(
    store: &mut EntityStore,
    rng: &mut R,
    flavor: GhostFlavor,
    grace: f32,
    delivery: &[Position],
) -> Option<EntityId> {
    let Some(anchor) = random_free_anchor(store, rng, Size::ONE, delivery) else {
        warn!("[Ghost] No free tile to place a {:?} ghost", flavor);
        return None;
    };
    let id = store.spawn(Entity::ghost(flavor, grace), anchor).ok()?;
    debug!("[Ghost] {:?} ghost {} spawned at {:?}", flavor, id, anchor);
    Some(id)
}

/// Scatter `count` fire/ice tiles on free, non-delivery cells. Returns how many landed.
pub fn spawn_trait_tiles<R: Rng + ?Sized>(
    store: &mut EntityStore,
    rng: &mut R,
    count: u32,
    delivery: &[Position],
) -> u32 {
    let mut placed = 0;
    for _ in 0..count {
        let tag = if rng.random_bool(0.5) { TraitTag::Fire } else { TraitTag::Ice };
        let Some(anchor) = random_free_anchor(store, rng, Size::ONE, delivery) else {
            warn!("[Traits] No free tile to place a {:?} tile", tag);
            break;
        };
        if store.spawn(Entity::trait_tile(tag), anchor).is_ok() {
            placed += 1;
        }
    }
    placed
}

/// `count` distinct random cells of a `grid_size`² grid.
pub fn pick_delivery_zones<R: Rng + ?Sized>(grid_size: usize, count: usize, rng: &mut R) -> Vec<Position> {
    let side = grid_size as i32;
    (0..side * side)
        .map(|i| Position::new(i % side, i / side))
        .choose_multiple(rng, count.min(grid_size * grid_size))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConveyorItem {
    pub kind: ItemKind,
    pub subtype: ItemSubtype,
}

impl ConveyorItem {
    fn natural(subtype: ItemSubtype) -> Self {
        Self {
            kind: ItemKind::for_subtype(subtype).unwrap_or(ItemKind::PlainBox),
            subtype,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let subtype = *ItemSubtype::SPAWNABLE.choose(rng).unwrap_or(&ItemSubtype::Bread);
        if rng.random_bool(PLAIN_BOX_CHANCE) {
            Self { kind: ItemKind::PlainBox, subtype }
        } else {
            Self::natural(subtype)
        }
    }

    pub fn entity(self) -> Entity {
        Entity::item(self.kind, self.subtype)
    }
}

/// Fixed-length queue of upcoming items; taking one refills the tail.
#[derive(Debug, Clone)]
pub struct Conveyor {
    queue: VecDeque<ConveyorItem>,
}

impl Conveyor {
    pub fn new() -> Self {
        let queue = [ItemSubtype::Bread, ItemSubtype::Knife, ItemSubtype::Bottle]
            .into_iter()
            .map(ConveyorItem::natural)
            .take(CONVEYOR_LEN)
            .collect();
        Self { queue }
    }

    pub fn peek(&self) -> Option<ConveyorItem> {
        self.queue.front().copied()
    }

    pub fn upcoming(&self) -> Vec<ConveyorItem> {
        self.queue.iter().copied().collect()
    }

    /// Pops the head and refills the tail with a random item.
    pub fn take<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ConveyorItem {
        let head = self.queue.pop_front().unwrap_or_else(|| ConveyorItem::random(rng));
        self.queue.push_back(ConveyorItem::random(rng));
        head
    }
}

impl Default for Conveyor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ghost_spawn_avoids_delivery_and_items() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = EntityStore::new(3);
        let delivery = vec![Position::new(0, 0), Position::new(1, 1)];
        for y in 0..3 {
            store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(2, y)).unwrap();
        }
        for _ in 0..4 {
            let id = spawn_ghost(&mut store, &mut rng, GhostFlavor::Wisp, 0.0, &delivery).unwrap();
            let anchor = store.get(id).unwrap().anchor;
            assert!(!delivery.contains(&anchor));
        }
        // 9 cells: 3 tiles, 2 delivery, 4 ghosts.
        assert!(spawn_ghost(&mut store, &mut rng, GhostFlavor::Wisp, 0.0, &delivery).is_none());
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_conveyor_keeps_its_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut conveyor = Conveyor::new();
        assert_eq!(conveyor.peek().map(|i| i.subtype), Some(ItemSubtype::Bread));
        let first = conveyor.take(&mut rng);
        assert_eq!(first.kind, ItemKind::Bread);
        for _ in 0..20 {
            conveyor.take(&mut rng);
            assert_eq!(conveyor.upcoming().len(), CONVEYOR_LEN);
        }
    }

    #[test]
    fn test_delivery_zones_are_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        let zones = pick_delivery_zones(10, 5, &mut rng);
        assert_eq!(zones.len(), 5);
        for (i, z) in zones.iter().enumerate() {
            assert!(!zones[i + 1..].contains(z));
        }
    }
}
