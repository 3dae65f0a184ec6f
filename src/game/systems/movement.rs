//! Movement resolver.
//!
//! A move request is resolved in two phases. Planning walks the push chain
//! breadth-first without touching the grid; committing lifts every chain
//! member, deletes consumed tiles and re-places the chain one step further.
//! A move therefore either happens completely or not at all.

use std::collections::{BTreeSet, VecDeque};

use log::error;

use crate::game::entities::{EntityId, EntityKind};
use crate::game::error::MoveError;
use crate::game::grid::EntityStore;
use crate::game::types::{Direction, Position, TraitSet};

/// Who is asking for the move and what it may do on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRules {
    /// Blocking items may be shoved along the chain.
    pub allow_push: bool,
    /// Trait tiles of these traits are consumed instead of blocking.
    pub immune: TraitSet,
}

impl MoveRules {
    /// Player-driven moves: no pushing, tiles consumed per active immunity.
    pub fn player(immune: TraitSet) -> Self {
        Self { allow_push: false, immune }
    }

    pub fn autonomous(allow_push: bool) -> Self {
        Self { allow_push, immune: TraitSet::empty() }
    }
}

/// A validated chain move, ready to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub direction: Direction,
    /// Chain members, farthest along `direction` first.
    pub chain: Vec<EntityId>,
    /// Trait tiles swallowed by an immune mover.
    pub consumed: Vec<EntityId>,
}

pub fn plan_move(
    store: &EntityStore,
    root: EntityId,
    direction: Direction,
    rules: MoveRules,
) -> Result<MovePlan, MoveError> {
    if !store.contains(root) {
        return Err(MoveError::UnknownEntity(root));
    }
    let mut queue = VecDeque::from([root]);
    let mut in_chain = BTreeSet::from([root]);
    let mut chain = vec![root];
    let mut consumed = Vec::new();

    while let Some(id) = queue.pop_front() {
        let Some(mover) = store.get(id) else {
            return Err(MoveError::UnknownEntity(id));
        };
        let new_anchor = mover.anchor.offset(direction);
        if !store.grid().footprint_in_bounds(new_anchor, mover.size) {
            return Err(MoveError::OutOfBounds(id));
        }

        let mut blockers: Vec<EntityId> = Vec::new();
        for cell in mover.size.cells(new_anchor) {
            if let Some(other) = store.id_at(cell) {
                if other != id && !blockers.contains(&other) {
                    blockers.push(other);
                }
            }
        }

        for blocker_id in blockers {
            if in_chain.contains(&blocker_id) || consumed.contains(&blocker_id) {
                continue;
            }
            let Some(blocker) = store.get(blocker_id) else {
                return Err(MoveError::UnknownEntity(blocker_id));
            };
            match blocker.kind {
                EntityKind::TraitTile(tag) => {
                    if mover.is_item() && rules.immune.contains(tag) {
                        consumed.push(blocker_id);
                    } else {
                        return Err(MoveError::TileInTheWay { mover: id, tile: blocker_id });
                    }
                }
                EntityKind::Ghost(_) => return Err(MoveError::GhostInTheWay { ghost: blocker_id }),
                EntityKind::Item(_) => {
                    if !rules.allow_push {
                        return Err(MoveError::PushDenied { mover: id, blocker: blocker_id });
                    }
                    in_chain.insert(blocker_id);
                    chain.push(blocker_id);
                    queue.push_back(blocker_id);
                }
            }
        }
    }

    chain.sort_by_key(|id| {
        std::cmp::Reverse(
            store
                .get(*id)
                .map(|e| e.cells().map(|c| direction.progress(c)).max().unwrap_or(i32::MIN))
                .unwrap_or(i32::MIN),
        )
    });

    Ok(MovePlan { direction, chain, consumed })
}

/// Apply a plan produced by [`plan_move`] against the same store state.
pub fn commit_move(store: &mut EntityStore, plan: &MovePlan) {
    for tile in &plan.consumed {
        store.despawn(*tile);
    }
    let targets: Vec<(EntityId, Position)> = plan
        .chain
        .iter()
        .filter_map(|id| store.get(*id).map(|e| (*id, e.anchor.offset(plan.direction))))
        .collect();
    for (id, _) in &targets {
        store.remove(*id);
    }
    for (id, anchor) in targets {
        if let Err(err) = store.place(id, anchor) {
            debug_assert!(false, "validated move failed to commit: {err}");
            error!("[Movement] Commit of {} failed: {}", id, err);
        }
    }
}

/// Plan and commit in one call.
pub fn move_entity(
    store: &mut EntityStore,
    root: EntityId,
    direction: Direction,
    rules: MoveRules,
) -> Result<MovePlan, MoveError> {
    let plan = plan_move(store, root, direction, rules)?;
    commit_move(store, &plan);
    Ok(plan)
}

/// `true` if the move (and any chain it pushes) happened.
pub fn try_move(store: &mut EntityStore, root: EntityId, direction: Direction, allow_push: bool) -> bool {
    move_entity(store, root, direction, MoveRules::autonomous(allow_push)).is_ok()
}

/// Keep moving one cell at a time until a step fails. Returns the number of
/// cells travelled and the error that stopped the slide, if any.
pub fn slide(
    store: &mut EntityStore,
    root: EntityId,
    direction: Direction,
    rules: MoveRules,
) -> (u32, Option<MoveError>) {
    let mut steps = 0;
    // The grid is finite, so a slide ends after at most `size` steps.
    let limit = store.grid().size() as u32;
    while steps < limit {
        match move_entity(store, root, direction, rules) {
            Ok(_) => steps += 1,
            Err(err) => return (steps, Some(err)),
        }
    }
    (steps, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Entity;
    use crate::game::types::{GhostFlavor, ItemKind, ItemSubtype, TraitTag};

    fn bread() -> Entity {
        Entity::item(ItemKind::Bread, ItemSubtype::Bread)
    }

    fn anchor(store: &EntityStore, id: EntityId) -> Position {
        store.get(id).unwrap().anchor
    }

    #[test]
    fn test_single_step_into_free_cell() {
        let mut store = EntityStore::new(5);
        let id = store.spawn(bread(), Position::new(2, 2)).unwrap();
        assert!(try_move(&mut store, id, Direction::Right, false));
        assert_eq!(anchor(&store, id), Position::new(3, 2));
        assert!(store.grid().is_free(Position::new(2, 2)));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_out_of_bounds_is_refused() {
        let mut store = EntityStore::new(5);
        let id = store
            .spawn(Entity::item(ItemKind::Sword, ItemSubtype::Knife), Position::new(3, 0))
            .unwrap();
        assert_eq!(
            plan_move(&store, id, Direction::Right, MoveRules::autonomous(true)),
            Err(MoveError::OutOfBounds(id))
        );
        assert!(!try_move(&mut store, id, Direction::Up, true));
        assert_eq!(anchor(&store, id), Position::new(3, 0));
    }

    #[test]
    fn test_wide_item_moves_into_its_own_cell() {
        let mut store = EntityStore::new(5);
        let id = store
            .spawn(Entity::item(ItemKind::Sword, ItemSubtype::Knife), Position::new(0, 0))
            .unwrap();
        assert!(try_move(&mut store, id, Direction::Right, false));
        assert_eq!(anchor(&store, id), Position::new(1, 0));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_push_chain_moves_everything_or_nothing() {
        let mut store = EntityStore::new(6);
        let a = store.spawn(bread(), Position::new(0, 1)).unwrap();
        let b = store
            .spawn(Entity::item(ItemKind::Potion, ItemSubtype::Bottle), Position::new(1, 0))
            .unwrap();
        let c = store.spawn(bread(), Position::new(2, 0)).unwrap();

        let plan = plan_move(&store, a, Direction::Right, MoveRules::autonomous(true)).unwrap();
        assert_eq!(plan.chain, vec![c, b, a]);
        commit_move(&mut store, &plan);
        assert_eq!(anchor(&store, a), Position::new(1, 1));
        assert_eq!(anchor(&store, b), Position::new(2, 0));
        assert_eq!(anchor(&store, c), Position::new(3, 0));
        assert!(store.verify().is_ok());

        // Two more pushes fit; the third runs c into the wall and nothing moves.
        assert!(try_move(&mut store, a, Direction::Right, true));
        assert!(try_move(&mut store, a, Direction::Right, true));
        let before: Vec<_> = [a, b, c].iter().map(|id| anchor(&store, *id)).collect();
        assert!(!try_move(&mut store, a, Direction::Right, true));
        let after: Vec<_> = [a, b, c].iter().map(|id| anchor(&store, *id)).collect();
        assert_eq!(before, after);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_push_denied_without_permission() {
        let mut store = EntityStore::new(5);
        let a = store.spawn(bread(), Position::new(0, 0)).unwrap();
        let b = store.spawn(bread(), Position::new(1, 0)).unwrap();
        assert_eq!(
            plan_move(&store, a, Direction::Right, MoveRules::player(TraitSet::empty())),
            Err(MoveError::PushDenied { mover: a, blocker: b })
        );
    }

    #[test]
    fn test_ghosts_and_tiles_are_never_pushed() {
        let mut store = EntityStore::new(5);
        let a = store.spawn(bread(), Position::new(0, 0)).unwrap();
        let ghost = store.spawn(Entity::ghost(GhostFlavor::Wisp, 0.0), Position::new(1, 0)).unwrap();
        let tile = store.spawn(Entity::trait_tile(TraitTag::Ice), Position::new(0, 1)).unwrap();
        store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(1, 1)).unwrap();
        assert_eq!(
            plan_move(&store, a, Direction::Right, MoveRules::autonomous(true)),
            Err(MoveError::GhostInTheWay { ghost })
        );
        assert_eq!(
            plan_move(&store, a, Direction::Down, MoveRules::autonomous(true)),
            Err(MoveError::TileInTheWay { mover: a, tile })
        );
        // A ghost walking into a tile is blocked as well.
        assert!(!try_move(&mut store, ghost, Direction::Down, true));
    }

    #[test]
    fn test_immune_mover_consumes_tile_on_commit_only() {
        let mut store = EntityStore::new(3);
        let a = store.spawn(bread(), Position::new(0, 0)).unwrap();
        let tile = store.spawn(Entity::trait_tile(TraitTag::Fire), Position::new(1, 0)).unwrap();
        let immune: TraitSet = [TraitTag::Fire].into_iter().collect();

        let plan = plan_move(&store, a, Direction::Right, MoveRules::player(immune)).unwrap();
        assert_eq!(plan.consumed, vec![tile]);
        // Planning alone leaves the tile in place.
        assert!(store.contains(tile));

        commit_move(&mut store, &plan);
        assert!(!store.contains(tile));
        assert_eq!(anchor(&store, a), Position::new(1, 0));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_ice_slide_stops_before_obstacle() {
        let mut store = EntityStore::new(10);
        let a = store.spawn(bread().with_traits(&[TraitTag::Ice]), Position::new(2, 2)).unwrap();
        store.spawn(bread(), Position::new(5, 2)).unwrap();
        let (steps, err) = slide(&mut store, a, Direction::Right, MoveRules::player(TraitSet::empty()));
        assert_eq!(steps, 2);
        assert!(matches!(err, Some(MoveError::PushDenied { .. })));
        assert_eq!(anchor(&store, a), Position::new(4, 2));
        assert!(!try_move(&mut store, a, Direction::Right, false));
    }

    #[test]
    fn test_slide_stops_at_boundary() {
        let mut store = EntityStore::new(6);
        let a = store.spawn(bread(), Position::new(1, 4)).unwrap();
        let (steps, err) = slide(&mut store, a, Direction::Up, MoveRules::player(TraitSet::empty()));
        assert_eq!(steps, 4);
        assert_eq!(err, Some(MoveError::OutOfBounds(a)));
        assert_eq!(anchor(&store, a), Position::new(1, 0));
    }
}
