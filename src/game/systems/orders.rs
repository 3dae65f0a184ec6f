//! Order / match engine.
//!
//! At most one order is open at a time. An order is drawn from the current
//! stage's list in cycle, ticks down, and is closed either by a submission
//! (fulfilled or failed) or by expiring. Reputation and capacity effects are
//! applied by the caller.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::StageSpec;
use crate::game::entities::Entity;
use crate::game::types::{ItemSubtype, TraitSet};

/// What a customer asks for: an item subtype carrying at least these traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub subtype: ItemSubtype,
    #[serde(default)]
    pub required: TraitSet,
}

impl OrderSpec {
    pub fn new(subtype: ItemSubtype, required: TraitSet) -> Self {
        Self { subtype, required }
    }

    /// Subtype equal and every required trait present. Extra traits are fine.
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.is_item() && entity.subtype == self.subtype && self.required.is_subset(entity.traits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub spec: OrderSpec,
    pub time_left: f32,
    pub lifetime: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    Fulfilled(Order),
    Failed(Order),
    /// Nothing was open; the submission is refused without effect.
    NoOrder,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    current: Option<Order>,
    cursor: usize,
    fulfilled_in_stage: u32,
    fulfilled_total: u32,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    pub fn fulfilled_in_stage(&self) -> u32 {
        self.fulfilled_in_stage
    }

    pub fn fulfilled_total(&self) -> u32 {
        self.fulfilled_total
    }

    /// Open the next order of `stage`, replacing any open one.
    pub fn generate(&mut self, stage: &StageSpec) -> Option<&Order> {
        if stage.orders.is_empty() {
            self.current = None;
            return None;
        }
        let spec = stage.orders[self.cursor % stage.orders.len()];
        self.cursor += 1;
        debug!(
            "[Orders] New order: {:?} with {:?} ({:.0}s)",
            spec.subtype,
            Vec::from(spec.required),
            stage.order_lifetime
        );
        self.current = Some(Order {
            spec,
            time_left: stage.order_lifetime,
            lifetime: stage.order_lifetime,
        });
        self.current.as_ref()
    }

    /// Restart the cycle and fulfilment count for a fresh stage.
    pub fn enter_stage(&mut self, stage: &StageSpec) {
        self.cursor = 0;
        self.fulfilled_in_stage = 0;
        self.generate(stage);
    }

    /// Judge `entity` against the open order and close it.
    pub fn submit(&mut self, entity: &Entity) -> SubmitOutcome {
        let Some(order) = self.current.take() else {
            return SubmitOutcome::NoOrder;
        };
        if order.spec.matches(entity) {
            self.fulfilled_in_stage += 1;
            self.fulfilled_total += 1;
            info!("[Orders] {} fulfilled {:?}", entity.id, order.spec.subtype);
            SubmitOutcome::Fulfilled(order)
        } else {
            info!("[Orders] {} rejected for {:?}", entity.id, order.spec.subtype);
            SubmitOutcome::Failed(order)
        }
    }

    /// Count the open order down. Returns it once it expires.
    pub fn tick(&mut self, dt: f32) -> Option<Order> {
        let order = self.current.as_mut()?;
        order.time_left -= dt;
        if order.time_left > 0.0 {
            return None;
        }
        let expired = self.current.take();
        if let Some(order) = &expired {
            info!("[Orders] {:?} order expired", order.spec.subtype);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_stages;
    use crate::game::types::{ItemKind, TraitTag};

    fn bread(traits: &[TraitTag]) -> Entity {
        Entity::item(ItemKind::Bread, ItemSubtype::Bread).with_traits(traits)
    }

    #[test]
    fn test_match_requires_subtype_and_subset() {
        let fiery = OrderSpec::new(ItemSubtype::Bread, [TraitTag::Fire].into_iter().collect());
        assert!(fiery.matches(&bread(&[TraitTag::Fire])));
        assert!(fiery.matches(&bread(&[TraitTag::Fire, TraitTag::Sentient])));
        assert!(!fiery.matches(&bread(&[])));
        assert!(!fiery.matches(&bread(&[TraitTag::Ice])));

        let knife = Entity::item(ItemKind::Sword, ItemSubtype::Knife).with_traits(&[TraitTag::Fire]);
        assert!(!fiery.matches(&knife));

        let plain = OrderSpec::new(ItemSubtype::Bread, TraitSet::empty());
        assert!(plain.matches(&bread(&[TraitTag::Haunted])));
        assert!(!plain.matches(&Entity::trait_tile(TraitTag::Fire)));
    }

    #[test]
    fn test_fire_and_ice_order_cannot_be_met() {
        let both = OrderSpec::new(ItemSubtype::Bread, [TraitTag::Fire, TraitTag::Ice].into_iter().collect());
        // Applying Ice strips Fire again.
        assert!(!both.matches(&bread(&[TraitTag::Fire, TraitTag::Ice])));
    }

    #[test]
    fn test_orders_cycle_through_stage() {
        let stage = &default_stages()[0];
        let mut book = OrderBook::new();
        book.enter_stage(stage);
        let mut seen = Vec::new();
        for _ in 0..stage.orders.len() + 1 {
            seen.push(book.current().unwrap().spec);
            book.generate(stage);
        }
        assert_eq!(seen[0], stage.orders[0]);
        assert_eq!(seen[stage.orders.len()], stage.orders[0]);
    }

    #[test]
    fn test_submit_and_expiry_close_the_order() {
        let stage = &default_stages()[0];
        let mut book = OrderBook::new();
        assert_eq!(book.submit(&bread(&[])), SubmitOutcome::NoOrder);

        book.enter_stage(stage);
        assert!(matches!(book.submit(&bread(&[])), SubmitOutcome::Fulfilled(_)));
        assert_eq!(book.fulfilled_in_stage(), 1);
        assert!(book.current().is_none());

        book.generate(stage);
        assert!(matches!(book.submit(&bread(&[])), SubmitOutcome::Failed(_)));
        assert_eq!(book.fulfilled_in_stage(), 1);

        book.generate(stage);
        assert!(book.tick(stage.order_lifetime - 1.0).is_none());
        assert!(book.tick(1.0).is_some());
        assert!(book.current().is_none());
        assert!(book.tick(1.0).is_none());
    }
}
