//! Sentient and haunted items wander on their own.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::game::entities::EntityId;
use crate::game::grid::EntityStore;
use crate::game::systems::movement::try_move;
use crate::game::types::Direction;

/// One wander pass: every willful item except `selected` gets a `chance`
/// roll to step in a random direction. Returns the items that moved.
pub fn wander<R: Rng + ?Sized>(
    store: &mut EntityStore,
    rng: &mut R,
    selected: Option<EntityId>,
    chance: f64,
) -> Vec<EntityId> {
    let mut walkers = store.ids_where(|e| e.is_item() && e.is_willful());
    walkers.shuffle(rng);

    let mut moved = Vec::new();
    for id in walkers {
        if Some(id) == selected || !rng.random_bool(chance) {
            continue;
        }
        let Some(direction) = Direction::ALL.choose(rng).copied() else {
            continue;
        };
        if try_move(store, id, direction, false) {
            moved.push(id);
        }
    }
    moved
}
