//! Ghost AI.
//!
//! Ghosts act on a coarse tick: they take one greedy step toward the
//! nearest item (falling back to a random free direction), then pulse their
//! aura over the surrounding 3×3 block once their cooldown allows it.

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::game::entities::EntityId;
use crate::game::grid::EntityStore;
use crate::game::systems::movement::try_move;
use crate::game::types::{Direction, GhostFlavor, Position, TraitTag};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostRules {
    pub step_seconds: f32,
    pub haunt_cooldown: f32,
    pub allow_push: bool,
}

/// What the ghosts did during one update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GhostReport {
    pub steps: u32,
    /// Items that picked up a trait from a ghost pulse.
    pub affected: Vec<EntityId>,
    /// Wisps that spent themselves haunting, with the item they possessed.
    pub consumed: Vec<(EntityId, EntityId)>,
}

/// Greedy single-step direction toward the Manhattan-nearest item: move
/// along the axis with the larger gap (x on ties).
pub fn chase_direction(store: &EntityStore, ghost: EntityId) -> Option<Direction> {
    let from = store.get(ghost)?.anchor;
    let target = store
        .iter()
        .filter(|e| e.is_item() && store.is_placed(e.id))
        .map(|e| e.nearest_cell_to(from))
        .min_by_key(|cell| cell.manhattan(from))?;

    let (dx, dy) = (target.x - from.x, target.y - from.y);
    if dx == 0 && dy == 0 {
        return None;
    }
    Some(if dx.abs() >= dy.abs() {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

/// Chase step with random fallback. Returns `true` if the ghost moved.
pub fn step_ghost<R: Rng + ?Sized>(store: &mut EntityStore, rng: &mut R, ghost: EntityId, allow_push: bool) -> bool {
    let chase = chase_direction(store, ghost);
    if let Some(direction) = chase {
        if try_move(store, ghost, direction, allow_push) {
            return true;
        }
    }
    let mut directions = Direction::ALL;
    directions.shuffle(rng);
    directions
        .into_iter()
        .filter(|d| Some(*d) != chase)
        .any(|d| try_move(store, ghost, d, allow_push))
}

fn neighborhood(center: Position) -> impl Iterator<Item = Position> {
    (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| Position::new(center.x + dx, center.y + dy)))
}

/// Pulse the ghost's aura over its 3×3 neighbourhood. Returns the items
/// that gained the ghost's trait.
pub fn haunt(store: &mut EntityStore, ghost: EntityId) -> Vec<EntityId> {
    let Some((center, flavor)) = store.get(ghost).and_then(|g| g.ghost_state().map(|s| (g.anchor, s.flavor))) else {
        return Vec::new();
    };
    let tag = match flavor {
        GhostFlavor::Wisp => TraitTag::Sentient,
        GhostFlavor::Ember => TraitTag::Fire,
        GhostFlavor::Frost => TraitTag::Ice,
    };

    let mut targets: Vec<EntityId> = Vec::new();
    for cell in neighborhood(center) {
        if let Some(entity) = store.at(cell) {
            if entity.is_item() && !targets.contains(&entity.id) {
                targets.push(entity.id);
            }
        }
    }

    let mut affected = Vec::new();
    for id in targets {
        if let Some(entity) = store.get_mut(id) {
            if !entity.has(tag) {
                entity.apply_trait(tag);
                affected.push(id);
            }
        }
    }
    affected
}

/// Advance every ghost by `dt`.
pub fn update_ghosts<R: Rng + ?Sized>(store: &mut EntityStore, rng: &mut R, dt: f32, rules: GhostRules) -> GhostReport {
    let mut report = GhostReport::default();
    for id in store.ids_where(|e| e.is_ghost()) {
        let Some(entity) = store.get_mut(id) else {
            continue;
        };
        let ready_to_haunt = entity.active_cooldown <= 0.0;
        let Some(state) = entity.ghost_state_mut() else {
            continue;
        };
        if state.grace > 0.0 {
            state.grace -= dt;
            continue;
        }
        let interval = match state.flavor {
            GhostFlavor::Frost => rules.step_seconds * 0.5,
            GhostFlavor::Wisp | GhostFlavor::Ember => rules.step_seconds,
        };
        state.step_timer += dt;
        if state.step_timer < interval {
            continue;
        }
        state.step_timer -= interval;
        let flavor = state.flavor;

        if step_ghost(store, rng, id, rules.allow_push) {
            report.steps += 1;
        }
        if !ready_to_haunt {
            continue;
        }

        let affected = haunt(store, id);
        if affected.is_empty() {
            continue;
        }
        if let Some(ghost) = store.get_mut(id) {
            ghost.active_cooldown = rules.haunt_cooldown;
        }
        if flavor == GhostFlavor::Wisp {
            let Some(center) = store.get(id).map(|g| g.anchor) else {
                continue;
            };
            let host = affected
                .iter()
                .copied()
                .min_by_key(|a| store.get(*a).map(|e| e.nearest_cell_to(center).manhattan(center)).unwrap_or(i32::MAX));
            store.despawn(id);
            if let Some(host) = host {
                if let Some(item) = store.get_mut(host) {
                    item.apply_trait(TraitTag::Haunted);
                }
                info!("[Ghost] Wisp {} possessed {}", id, host);
                report.consumed.push((id, host));
            }
        } else {
            debug!("[Ghost] {:?} ghost {} touched {} items", flavor, id, affected.len());
        }
        report.affected.extend(affected);
    }
    report
}
