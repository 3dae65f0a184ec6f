//! Read-only view of a [`GameState`], produced once per tick.
//!
//! Snapshots own their data so that they can be cloned into actor messages and
//! serialized without holding any reference into the simulation.

use serde::{Deserialize, Serialize};

use crate::game::entities::{ConveyorItem, EntityId, EntityKind};
use crate::game::state::{GameState, Immunity, Phase};
use crate::game::systems::aura::CellAura;
use crate::game::systems::capacity::CapacityView;
use crate::game::systems::orders::Order;
use crate::game::types::{ItemSubtype, Position, Size, TraitSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub subtype: ItemSubtype,
    pub traits: TraitSet,
    pub anchor: Position,
    pub size: Size,
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub entity: Option<EntityView>,
    /// `true` only on the anchor cell of a multi-cell entity.
    pub is_anchor: bool,
    pub aura: CellAura,
    pub selected: bool,
    pub delivery: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub grid_size: usize,
    /// Row-major, `grid_size * grid_size` cells.
    pub cells: Vec<CellView>,
    pub selector: Position,
    pub reputation: i32,
    pub order: Option<Order>,
    pub capacity: CapacityView,
    pub status: String,
    pub narrative: String,
    pub conveyor: Vec<ConveyorItem>,
    pub stage: usize,
    pub stage_name: String,
    pub phase: Phase,
    pub immunity: Immunity,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let store = state.store();
        let grid = store.grid();
        let aura = state.aura();
        let cells = grid
            .positions()
            .map(|pos| {
                let entity = store.at(pos);
                CellView {
                    is_anchor: entity.is_some_and(|e| e.anchor == pos),
                    entity: entity.map(|e| EntityView {
                        id: e.id,
                        kind: e.kind,
                        subtype: e.subtype,
                        traits: e.traits,
                        anchor: e.anchor,
                        size: e.size,
                        cooldown: e.active_cooldown,
                    }),
                    aura: aura.at(pos),
                    selected: pos == state.selector(),
                    delivery: state.is_delivery(pos),
                }
            })
            .collect();

        Self {
            tick: state.tick_count(),
            grid_size: grid.size(),
            cells,
            selector: state.selector(),
            reputation: state.reputation(),
            order: state.orders().current().copied(),
            capacity: state.capacity().view(),
            status: state.status().to_string(),
            narrative: state.narrative().to_string(),
            conveyor: state.conveyor().upcoming(),
            stage: state.stage(),
            stage_name: state.config().stages.get(state.stage()).map(|s| s.name.clone()).unwrap_or_default(),
            phase: state.phase(),
            immunity: state.immunity(),
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&CellView> {
        let side = self.grid_size as i32;
        if pos.x < 0 || pos.y < 0 || pos.x >= side || pos.y >= side {
            return None;
        }
        self.cells.get((pos.y * side + pos.x) as usize)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
