/// Progression stages.
///
/// A run walks through an ordered list of stages. Each stage cycles its own
/// order list and advances once enough orders were fulfilled; the last stage
/// never advances.
use serde::{Deserialize, Serialize};

use crate::game::systems::orders::OrderSpec;
use crate::game::types::{GhostFlavor, ItemSubtype, TraitTag};

/// Seconds an order stays open before it expires.
pub const ORDER_LIFETIME: f32 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    /// Line shown to the player when the stage starts.
    pub narrative: String,
    pub orders: Vec<OrderSpec>,
    /// Fulfilled orders needed to move on. `0` keeps the stage forever.
    pub orders_to_advance: u32,
    #[serde(default = "default_lifetime")]
    pub order_lifetime: f32,
    /// Ghosts released as soon as the stage starts.
    #[serde(default)]
    pub ghost_burst: Vec<GhostFlavor>,
    /// Seconds between timed ghost spawns, if any.
    #[serde(default)]
    pub ghost_interval: Option<f32>,
    #[serde(default)]
    pub trait_tiles: u32,
}

fn default_lifetime() -> f32 {
    ORDER_LIFETIME
}

fn order(subtype: ItemSubtype, required: &[TraitTag]) -> OrderSpec {
    OrderSpec::new(subtype, required.iter().copied().collect())
}

pub fn default_stages() -> Vec<StageSpec> {
    use ItemSubtype::*;
    use TraitTag::*;

    vec![
        StageSpec {
            name: "Opening Shift".to_string(),
            narrative: "The shop opens. Customers want it plain.".to_string(),
            orders: vec![
                order(Bread, &[]),
                order(Knife, &[]),
                order(Bread, &[Fire]),
                order(Bottle, &[]),
            ],
            orders_to_advance: 3,
            order_lifetime: ORDER_LIFETIME + 4.0,
            ghost_burst: Vec::new(),
            ghost_interval: None,
            trait_tiles: 2,
        },
        StageSpec {
            name: "Cold Front".to_string(),
            narrative: "Something moved in the cellar.".to_string(),
            orders: vec![
                order(Bottle, &[Ice]),
                order(Knife, &[Fire]),
                order(Bread, &[Sentient]),
                order(Bread, &[Ice]),
            ],
            orders_to_advance: 4,
            order_lifetime: ORDER_LIFETIME,
            ghost_burst: vec![GhostFlavor::Wisp, GhostFlavor::Ember],
            ghost_interval: Some(25.0),
            trait_tiles: 3,
        },
        StageSpec {
            name: "Haunted Hours".to_string(),
            narrative: "They all want something strange now.".to_string(),
            orders: vec![
                order(Knife, &[Sentient, Fire]),
                order(Bottle, &[Ice, Sentient]),
                order(Bread, &[Fire, Ice]),
                order(Bread, &[Sentient, Haunted]),
            ],
            orders_to_advance: 0,
            order_lifetime: ORDER_LIFETIME,
            ghost_burst: vec![GhostFlavor::Frost, GhostFlavor::Wisp, GhostFlavor::Ember],
            ghost_interval: Some(15.0),
            trait_tiles: 4,
        },
    ]
}
