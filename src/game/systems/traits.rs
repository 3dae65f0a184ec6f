//! Trait system: fire burn-out, tile absorption and global trait spread.

use log::debug;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::game::entities::{AbsorbTimer, Entity, EntityId, EntityKind};
use crate::game::grid::EntityStore;
use crate::game::types::{Position, TraitTag};

/// Burn down fire timers on every entity. Returns how many fires went out.
pub fn decay_fire(store: &mut EntityStore, dt: f32) -> u32 {
    let mut expired = 0;
    for entity in store.iter_mut() {
        if entity.tick_fire(dt) {
            expired += 1;
        }
    }
    expired
}

/// First adjacent tile (lowest id) whose trait `entity` does not hold yet.
fn absorbable_neighbor(store: &EntityStore, entity: &Entity) -> Option<(EntityId, TraitTag)> {
    let mut candidates: Vec<(EntityId, TraitTag)> = entity
        .border_cells()
        .into_iter()
        .filter_map(|cell| store.at(cell))
        .filter_map(|e| e.tile_trait().map(|tag| (e.id, tag)))
        .filter(|(_, tag)| !entity.has(*tag))
        .collect();
    candidates.sort_by_key(|(id, _)| *id);
    candidates.into_iter().next()
}

/// Advance every item's dwell timer next to trait tiles. An item that dwells
/// `threshold` seconds next to the same tile takes its trait and the tile is
/// deleted. Returns the absorptions that happened.
pub fn absorb_adjacent_tiles(store: &mut EntityStore, dt: f32, threshold: f32) -> Vec<(EntityId, TraitTag)> {
    let mut absorbed = Vec::new();
    for id in store.ids_where(|e| e.is_item()) {
        let Some(entity) = store.get(id) else {
            continue;
        };
        let candidate = absorbable_neighbor(store, entity);
        let previous = entity.absorb;

        let Some((tile, tag)) = candidate else {
            if let Some(e) = store.get_mut(id) {
                e.absorb = None;
            }
            continue;
        };

        let elapsed = match previous {
            Some(timer) if timer.tile == tile => timer.elapsed + dt,
            _ => dt,
        };

        if elapsed >= threshold {
            store.despawn(tile);
            if let Some(e) = store.get_mut(id) {
                e.apply_trait(tag);
                e.absorb = None;
            }
            debug!("[Traits] {} absorbed {:?} from tile {}", id, tag, tile);
            absorbed.push((id, tag));
        } else if let Some(e) = store.get_mut(id) {
            e.absorb = Some(AbsorbTimer { tile, elapsed });
        }
    }
    absorbed
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpreadOutcome {
    /// A new tile appeared next to its source.
    NewTile { tag: TraitTag, at: Position },
    /// A neighbouring item caught the trait directly.
    Caught { id: EntityId, tag: TraitTag },
}

/// One spread attempt: a random fire/ice tile ignites or freezes one
/// neighbouring cell, either spawning a new tile on an empty cell or handing
/// its trait to an item there.
pub fn spread_traits<R: Rng + ?Sized>(
    store: &mut EntityStore,
    rng: &mut R,
    delivery: &[Position],
) -> Option<SpreadOutcome> {
    let sources: Vec<(Position, TraitTag)> = store
        .iter()
        .filter_map(|e| match e.kind {
            EntityKind::TraitTile(tag @ (TraitTag::Fire | TraitTag::Ice)) => Some((e.anchor, tag)),
            _ => None,
        })
        .collect();
    let &(source, tag) = sources.choose(rng)?;

    let mut neighbors = source.neighbors();
    neighbors.shuffle(rng);
    for cell in neighbors {
        if !store.grid().in_bounds(cell) {
            continue;
        }
        match store.id_at(cell) {
            None => {
                if delivery.contains(&cell) {
                    continue;
                }
                if store.spawn(Entity::trait_tile(tag), cell).is_ok() {
                    debug!("[Traits] {:?} spread to {:?}", tag, cell);
                    return Some(SpreadOutcome::NewTile { tag, at: cell });
                }
            }
            Some(id) => {
                let Some(entity) = store.get_mut(id) else {
                    continue;
                };
                if entity.is_item() && !entity.has(tag) {
                    entity.apply_trait(tag);
                    debug!("[Traits] {} caught {:?} from a tile at {:?}", id, tag, source);
                    return Some(SpreadOutcome::Caught { id, tag });
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game::ABSORB_SECONDS;
    use crate::game::types::{ItemKind, ItemSubtype};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bread() -> Entity {
        Entity::item(ItemKind::Bread, ItemSubtype::Bread)
    }

    #[test]
    fn test_fire_tile_absorbed_after_dwell() {
        let mut store = EntityStore::new(10);
        let tile = store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(3, 3)).unwrap();
        let item = store.spawn(bread(), Position::new(3, 4)).unwrap();

        for _ in 0..3 {
            assert!(absorb_adjacent_tiles(&mut store, 0.5, ABSORB_SECONDS).is_empty());
        }
        assert_eq!(store.get(item).unwrap().absorb.map(|t| t.tile), Some(tile));

        let absorbed = absorb_adjacent_tiles(&mut store, 0.5, ABSORB_SECONDS);
        assert_eq!(absorbed, vec![(item, TraitTag::Fire)]);
        assert!(store.get(item).unwrap().has(TraitTag::Fire));
        assert!(!store.contains(tile));
        assert!(store.grid().is_free(Position::new(3, 3)));
    }

    #[test]
    fn test_leaving_adjacency_resets_timer() {
        let mut store = EntityStore::new(10);
        store.spawn(Entity::trait_tile(TraitTag::Ice), Position::new(3, 3)).unwrap();
        let item = store.spawn(bread(), Position::new(3, 4)).unwrap();

        absorb_adjacent_tiles(&mut store, 1.5, ABSORB_SECONDS);
        store.remove(item);
        store.place(item, Position::new(6, 6)).unwrap();
        absorb_adjacent_tiles(&mut store, 0.1, ABSORB_SECONDS);
        assert!(store.get(item).unwrap().absorb.is_none());

        store.remove(item);
        store.place(item, Position::new(3, 4)).unwrap();
        assert!(absorb_adjacent_tiles(&mut store, 1.5, ABSORB_SECONDS).is_empty());
        assert!(!store.get(item).unwrap().has(TraitTag::Ice));
    }

    #[test]
    fn test_switching_tiles_restarts_count() {
        let mut store = EntityStore::new(10);
        let first = store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(0, 0)).unwrap();
        let item = store.spawn(bread(), Position::new(1, 0)).unwrap();
        absorb_adjacent_tiles(&mut store, 1.5, ABSORB_SECONDS);

        store.despawn(first);
        let second = store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(2, 0)).unwrap();
        absorb_adjacent_tiles(&mut store, 1.0, ABSORB_SECONDS);
        let timer = store.get(item).unwrap().absorb.unwrap();
        assert_eq!(timer.tile, second);
        assert_eq!(timer.elapsed, 1.0);
    }

    #[test]
    fn test_held_trait_is_not_absorbed_again() {
        let mut store = EntityStore::new(10);
        let tile = store.spawn(Entity::trait_tile(TraitTag::Ice), Position::new(3, 3)).unwrap();
        let item = store.spawn(bread().with_traits(&[TraitTag::Ice]), Position::new(3, 4)).unwrap();
        assert!(absorb_adjacent_tiles(&mut store, 5.0, ABSORB_SECONDS).is_empty());
        assert!(store.contains(tile));
        assert!(store.get(item).unwrap().absorb.is_none());
    }

    #[test]
    fn test_decay_fire_expires() {
        let mut store = EntityStore::new(4);
        let item = store.spawn(bread().with_traits(&[TraitTag::Fire]), Position::new(0, 0)).unwrap();
        assert_eq!(decay_fire(&mut store, 4.0), 0);
        assert_eq!(decay_fire(&mut store, 1.0), 1);
        assert!(!store.get(item).unwrap().has(TraitTag::Fire));
    }

    #[test]
    fn test_spread_ignites_neighbor_or_spawns_tile() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut store = EntityStore::new(3);
        store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(1, 1)).unwrap();
        let item = store.spawn(bread(), Position::new(1, 0)).unwrap();
        // Block the other neighbours so the item is the only target.
        for pos in [Position::new(0, 1), Position::new(2, 1), Position::new(1, 2)] {
            store.spawn(bread().with_traits(&[TraitTag::Fire]), pos).unwrap();
        }
        let outcome = spread_traits(&mut store, &mut rng, &[]);
        assert_eq!(outcome, Some(SpreadOutcome::Caught { id: item, tag: TraitTag::Fire }));

        let mut store = EntityStore::new(3);
        store.spawn(Entity::trait_tile(TraitTag::Ice), Position::new(0, 0)).unwrap();
        let outcome = spread_traits(&mut store, &mut rng, &[Position::new(1, 0)]);
        assert_eq!(outcome, Some(SpreadOutcome::NewTile { tag: TraitTag::Ice, at: Position::new(0, 1) }));
    }
}
