//! Game state: owns one run of the simulation and drives its fixed-step tick.
//!
//! Every intent either fully applies or returns an [`ActionError`] and leaves
//! the state as it was (apart from the status line).

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, StageSpec};
use crate::game::entities::{pick_delivery_zones, spawn_ghost, spawn_trait_tiles, Conveyor, Entity, EntityId};
use crate::game::error::ActionError;
use crate::game::grid::EntityStore;
use crate::game::systems::aura::AuraMaps;
use crate::game::systems::capacity::{Capacity, CapacityInputs};
use crate::game::systems::ghost::{update_ghosts, GhostRules};
use crate::game::systems::movement::{move_entity, slide, MoveRules};
use crate::game::systems::orders::{OrderBook, SubmitOutcome};
use crate::game::systems::sentient::wander;
use crate::game::systems::traits::{absorb_adjacent_tiles, decay_fire, spread_traits};
use crate::game::types::{Direction, GhostFlavor, ItemKind, Position, Size, TraitSet, TraitTag};

/// Player input. Applied at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    MoveSelector(Direction),
    /// Jump the selector to a cell, like clicking it.
    SelectCell(Position),
    Shove(Direction),
    SpawnOrSubmit,
    UseSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    Collapse,
    Reputation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    GameOver(LossReason),
}

/// Seconds of protection left against each element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Immunity {
    pub fire: f32,
    pub ice: f32,
}

impl Immunity {
    pub fn active(&self) -> TraitSet {
        let mut set = TraitSet::empty();
        if self.fire > 0.0 {
            set.insert(TraitTag::Fire);
        }
        if self.ice > 0.0 {
            set.insert(TraitTag::Ice);
        }
        set
    }

    fn tick(&mut self, dt: f32) {
        self.fire = (self.fire - dt).max(0.0);
        self.ice = (self.ice - dt).max(0.0);
    }
}

pub struct GameState {
    config: EngineConfig,
    seed: u64,
    rng: StdRng,
    store: EntityStore,
    capacity: Capacity,
    orders: OrderBook,
    conveyor: Conveyor,
    delivery: Vec<Position>,
    selector: Position,
    status: String,
    narrative: String,
    reputation: i32,
    immunity: Immunity,
    stage: usize,
    spread_timer: f32,
    sentient_timer: f32,
    ghost_timer: Option<f32>,
    aura: AuraMaps,
    phase: Phase,
    tick: u64,
}

impl GameState {
    /// Start a run. `config` is expected to have passed `EngineConfig::validate`.
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        info!("[GameState] New run with seed {}", seed);

        let store = EntityStore::new(config.grid_size);
        let delivery = pick_delivery_zones(config.grid_size, config.delivery_zones, &mut rng);
        let center = (config.grid_size / 2) as i32;
        let spread_timer = next_spread_delay(&config, &mut rng);

        let mut state = Self {
            capacity: Capacity::new(config.economy),
            reputation: config.economy.start_reputation,
            seed,
            rng,
            store,
            orders: OrderBook::new(),
            conveyor: Conveyor::new(),
            delivery,
            selector: Position::new(center, center),
            status: "READY".to_string(),
            narrative: String::new(),
            immunity: Immunity::default(),
            stage: 0,
            spread_timer,
            sentient_timer: 0.0,
            ghost_timer: None,
            aura: AuraMaps::default(),
            phase: Phase::Running,
            tick: 0,
            config,
        };
        state.enter_stage(0);
        state.aura = AuraMaps::compute(&state.store);
        state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn conveyor(&self) -> &Conveyor {
        &self.conveyor
    }

    pub fn delivery_zones(&self) -> &[Position] {
        &self.delivery
    }

    pub fn is_delivery(&self, cell: Position) -> bool {
        self.delivery.contains(&cell)
    }

    pub fn selector(&self) -> Position {
        self.selector
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.store.id_at(self.selector)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn immunity(&self) -> Immunity {
        self.immunity
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn aura(&self) -> &AuraMaps {
        &self.aura
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    fn current_stage(&self) -> Option<&StageSpec> {
        self.config.stages.get(self.stage)
    }

    // ----------------------------
    // Intents
    // ----------------------------

    /// Apply one player intent. The outcome, success or refusal, is written to
    /// the status line.
    pub fn apply_intent(&mut self, intent: Intent) -> Result<(), ActionError> {
        if let Phase::GameOver(_) = self.phase {
            return Err(ActionError::GameOver);
        }
        let result = match intent {
            Intent::MoveSelector(direction) => {
                self.move_selector(direction);
                Ok(())
            }
            Intent::SelectCell(cell) => self.select_cell(cell),
            Intent::Shove(direction) => self.shove(direction),
            Intent::SpawnOrSubmit => self.spawn_or_submit(),
            Intent::UseSelected => self.use_selected(),
        };
        if let Err(err) = &result {
            debug!("[GameState] {:?} refused: {}", intent, err);
            self.status = err.to_string();
        }
        // Penalties inside an intent can end the run before the next tick.
        if self.capacity.check_collapse() {
            self.game_over(LossReason::Collapse);
        }
        result
    }

    fn move_selector(&mut self, direction: Direction) {
        let next = self.selector.offset(direction);
        if self.store.grid().in_bounds(next) {
            self.selector = next;
        }
    }

    fn select_cell(&mut self, cell: Position) -> Result<(), ActionError> {
        if !self.store.grid().in_bounds(cell) {
            return Err(ActionError::Blocked);
        }
        self.selector = cell;
        Ok(())
    }

    fn selected_item(&self) -> Result<&Entity, ActionError> {
        let entity = self.store.at(self.selector).ok_or(ActionError::NothingSelected)?;
        if !entity.is_item() {
            return Err(ActionError::NotMovable);
        }
        Ok(entity)
    }

    fn shove(&mut self, input: Direction) -> Result<(), ActionError> {
        let cost = self.config.economy.shove_cost;
        let item = self.selected_item()?;
        if !self.capacity.can_afford(cost) {
            return Err(ActionError::InsufficientEnergy { needed: cost, available: self.capacity.energy() });
        }
        let id = item.id;
        let from = item.anchor;
        let direction = if item.is_willful() { input.inverted() } else { input };
        let slides = item.has(TraitTag::Ice) && item.size == Size::ONE;

        let leaves_grid = item.cells().any(|c| !self.store.grid().in_bounds(c.offset(direction)));
        if leaves_grid && self.config.submit_edge == Some(direction) {
            self.deliver(id)?;
            return self.capacity.spend(cost);
        }

        let rules = MoveRules::player(self.immunity.active());
        if slides {
            let (steps, _) = slide(&mut self.store, id, direction, rules);
            if steps == 0 {
                return Err(ActionError::Blocked);
            }
            self.status = "SLID".to_string();
        } else {
            move_entity(&mut self.store, id, direction, rules).map_err(|err| {
                debug!("[Movement] {}", err);
                ActionError::Blocked
            })?;
            self.status = "MOVED".to_string();
        }

        if let Some(to) = self.store.get(id).map(|e| e.anchor) {
            self.selector = Position::new(self.selector.x + to.x - from.x, self.selector.y + to.y - from.y);
        }
        self.capacity.spend(cost)
    }

    fn spawn_or_submit(&mut self) -> Result<(), ActionError> {
        match self.selected() {
            None => self.spawn_from_conveyor(),
            Some(id) => {
                if !self.is_delivery(self.selector) {
                    return Err(ActionError::NotDeliveryZone);
                }
                self.deliver(id)
            }
        }
    }

    fn spawn_from_conveyor(&mut self) -> Result<(), ActionError> {
        let cost = self.config.economy.spawn_cost;
        let next = self.conveyor.peek().ok_or(ActionError::SpawnBlocked)?;
        if !self.store.can_place(self.selector, next.subtype.default_size()) {
            return Err(ActionError::SpawnBlocked);
        }
        self.capacity.spend(cost)?;
        let item = self.conveyor.take(&mut self.rng);
        match self.store.spawn(item.entity(), self.selector) {
            Ok(id) => {
                info!("[GameState] Spawned {:?} {} at {:?}", item.subtype, id, self.selector);
                self.status = "SPAWNED".to_string();
                Ok(())
            }
            Err(err) => {
                error!("[GameState] Spawn failed after check: {}", err);
                Err(ActionError::SpawnBlocked)
            }
        }
    }

    /// Hand an item to the open order. The item leaves the grid either way.
    fn deliver(&mut self, id: EntityId) -> Result<(), ActionError> {
        let entity = self.store.get(id).ok_or(ActionError::NothingSelected)?;
        if !entity.is_item() {
            return Err(ActionError::NotDeliverable);
        }
        if self.orders.current().is_none() {
            return Err(ActionError::NoOrder);
        }
        let anchor = entity.anchor;
        let haunted = entity.has(TraitTag::Haunted);
        let outcome = self.orders.submit(entity);
        self.store.despawn(id);

        let economy = self.config.economy;
        match outcome {
            SubmitOutcome::Fulfilled(_) => {
                self.reputation += economy.reputation_on_success;
                self.capacity.heal_hp(economy.order_heal);
                self.status = "ORDER FULFILLED".to_string();
                if haunted {
                    self.release_ghost(anchor);
                }
                self.after_fulfilment();
            }
            SubmitOutcome::Failed(_) => {
                self.reputation -= economy.reputation_on_failure;
                self.capacity.damage_hp(economy.order_failure_penalty);
                self.status = "WRONG DELIVERY".to_string();
                self.next_order();
            }
            SubmitOutcome::NoOrder => return Err(ActionError::NoOrder),
        }
        self.check_reputation();
        Ok(())
    }

    fn release_ghost(&mut self, at: Position) {
        let grace = self.config.hazards.ghost_spawn_grace;
        match self.store.spawn(Entity::ghost(GhostFlavor::Wisp, grace), at) {
            Ok(id) => info!("[Ghost] Delivery released ghost {} at {:?}", id, at),
            Err(err) => warn!("[Ghost] Could not release ghost at {:?}: {}", at, err),
        }
    }

    fn use_selected(&mut self) -> Result<(), ActionError> {
        let cost = self.config.economy.use_cost;
        let entity = self.store.at(self.selector).ok_or(ActionError::NothingSelected)?;
        let kind = entity.item_kind().ok_or(ActionError::NotUsable)?;
        let id = entity.id;
        if kind == ItemKind::PlainBox {
            return Err(ActionError::NotUsable);
        }
        if entity.active_cooldown > 0.0 {
            return Err(ActionError::OnCooldown(entity.active_cooldown));
        }
        self.capacity.spend(cost)?;
        match kind {
            ItemKind::Bread => self.eat_bread(id),
            ItemKind::Sword => self.swing_sword(id),
            ItemKind::Potion => self.drink_potion(id),
            ItemKind::PlainBox => {}
        }
        Ok(())
    }

    fn eat_bread(&mut self, id: EntityId) {
        self.store.despawn(id);
        self.capacity.heal_hp(self.config.economy.bread_heal);
        self.status = "ATE BREAD".to_string();
    }

    fn swing_sword(&mut self, id: EntityId) {
        let Some(sword) = self.store.get(id) else {
            return;
        };
        let mut targets: Vec<EntityId> = sword
            .border_cells()
            .into_iter()
            .filter_map(|cell| self.store.at(cell))
            .filter(|e| e.is_ghost() || e.is_tile())
            .map(|e| e.id)
            .collect();
        targets.sort();
        targets.dedup();

        if let Some(sword) = self.store.get_mut(id) {
            sword.active_cooldown = self.config.hazards.sword_cooldown;
        }
        if targets.is_empty() {
            self.capacity.damage_hp(self.config.economy.use_miss_penalty);
            self.status = "SWING MISSED".to_string();
            return;
        }
        for target in &targets {
            self.store.despawn(*target);
        }
        info!("[GameState] Sword {} cut down {} entities", id, targets.len());
        self.status = format!("CUT {}", targets.len());
    }

    fn drink_potion(&mut self, id: EntityId) {
        let Some(potion) = self.store.get(id) else {
            return;
        };
        let grants = match (potion.has(TraitTag::Fire), potion.has(TraitTag::Ice)) {
            (true, _) => (true, false),
            (_, true) => (false, true),
            _ => (true, true),
        };
        let neighbours: Vec<EntityId> = potion
            .border_cells()
            .into_iter()
            .filter_map(|cell| self.store.at(cell))
            .filter(|e| e.is_item())
            .map(|e| e.id)
            .collect();

        for neighbour in neighbours {
            if let Some(item) = self.store.get_mut(neighbour) {
                item.remove_trait(TraitTag::Fire);
                item.remove_trait(TraitTag::Ice);
            }
        }
        self.store.despawn(id);

        let duration = self.config.hazards.immunity_seconds;
        if grants.0 {
            self.immunity.fire = duration;
        }
        if grants.1 {
            self.immunity.ice = duration;
        }
        self.status = "POTION".to_string();
    }

    // ----------------------------
    // Progression
    // ----------------------------

    fn enter_stage(&mut self, index: usize) {
        let Some(stage) = self.config.stages.get(index).cloned() else {
            error!("[GameState] Stage {} does not exist", index);
            return;
        };
        self.stage = index;
        info!("[GameState] Stage {}: {}", index + 1, stage.name);
        self.narrative = stage.narrative.clone();
        self.orders.enter_stage(&stage);

        spawn_trait_tiles(&mut self.store, &mut self.rng, stage.trait_tiles, &self.delivery);
        let grace = self.config.hazards.ghost_spawn_grace;
        for flavor in &stage.ghost_burst {
            spawn_ghost(&mut self.store, &mut self.rng, *flavor, grace, &self.delivery);
        }
        self.ghost_timer = stage.ghost_interval;
    }

    fn after_fulfilment(&mut self) {
        let Some(stage) = self.current_stage() else {
            return;
        };
        let advance = stage.orders_to_advance > 0
            && self.orders.fulfilled_in_stage() >= stage.orders_to_advance
            && self.stage + 1 < self.config.stages.len();
        if advance {
            self.enter_stage(self.stage + 1);
        } else {
            self.next_order();
        }
    }

    fn next_order(&mut self) {
        if let Some(stage) = self.config.stages.get(self.stage) {
            self.orders.generate(stage);
        }
    }

    fn check_reputation(&mut self) {
        if self.reputation <= self.config.economy.min_reputation {
            self.game_over(LossReason::Reputation);
        }
    }

    fn game_over(&mut self, reason: LossReason) {
        if self.phase == Phase::Running {
            info!("[GameState] Game over: {:?} after {} ticks", reason, self.tick);
            self.phase = Phase::GameOver(reason);
            self.status = "GAME OVER".to_string();
        }
    }

    // ----------------------------
    // Tick
    // ----------------------------

    /// Advance the simulation by `dt` seconds. A finished run still counts
    /// ticks so that snapshots keep flowing.
    pub fn tick(&mut self, dt: f32) {
        self.tick += 1;
        if self.phase != Phase::Running {
            return;
        }
        self.immunity.tick(dt);
        for entity in self.store.iter_mut() {
            entity.active_cooldown = (entity.active_cooldown - dt).max(0.0);
        }

        self.update_traits(dt);
        self.update_ghosts(dt);
        self.update_sentient(dt);
        self.aura = AuraMaps::compute(&self.store);
        self.update_capacity(dt);
        self.update_orders(dt);
        self.check_reputation();

        if let Err(violation) = self.store.verify() {
            error!("[GameState] Grid invariant broken: {}", violation);
            debug_assert!(false, "grid invariant broken: {violation}");
        }
    }

    fn update_traits(&mut self, dt: f32) {
        if decay_fire(&mut self.store, dt) > 0 {
            self.status = "FIRE EXPIRED".to_string();
        }
        absorb_adjacent_tiles(&mut self.store, dt, self.config.hazards.absorb_seconds);

        self.spread_timer -= dt;
        if self.spread_timer <= 0.0 {
            self.spread_timer = next_spread_delay(&self.config, &mut self.rng);
            if self.rng.random_bool(self.config.hazards.spread_chance) {
                spread_traits(&mut self.store, &mut self.rng, &self.delivery);
            }
        }
    }

    fn update_ghosts(&mut self, dt: f32) {
        let hazards = self.config.hazards;
        let rules = GhostRules {
            step_seconds: hazards.ghost_step_seconds,
            haunt_cooldown: hazards.ghost_haunt_cooldown,
            allow_push: self.config.ghosts_push_items,
        };
        let report = update_ghosts(&mut self.store, &mut self.rng, dt, rules);
        if !report.consumed.is_empty() {
            self.status = "HAUNTED".to_string();
        }

        let interval = self.current_stage().and_then(|s| s.ghost_interval);
        if let (Some(timer), Some(interval)) = (self.ghost_timer.as_mut(), interval) {
            *timer -= dt;
            if *timer <= 0.0 {
                *timer += interval;
                let flavor = [GhostFlavor::Wisp, GhostFlavor::Ember, GhostFlavor::Frost]
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(GhostFlavor::Wisp);
                spawn_ghost(&mut self.store, &mut self.rng, flavor, hazards.ghost_spawn_grace, &self.delivery);
            }
        }
    }

    fn update_sentient(&mut self, dt: f32) {
        let period = self.config.hazards.sentient_tick_seconds;
        self.sentient_timer += dt;
        if self.sentient_timer < period {
            return;
        }
        self.sentient_timer -= period;
        let selected = self.selected();
        wander(&mut self.store, &mut self.rng, selected, self.config.hazards.sentient_move_chance);
    }

    fn update_capacity(&mut self, dt: f32) {
        let hazards = self.config.hazards;
        let here = self.aura.at(self.selector);
        let immune = self.immunity.active();
        if here.fire && !immune.contains(TraitTag::Fire) {
            self.capacity.damage_hp(hazards.fire_aura_damage * dt);
        }
        if here.ice && !immune.contains(TraitTag::Ice) {
            self.capacity.damage_hp(hazards.ice_aura_damage * dt);
        }

        let grid = self.store.grid();
        let fullness = (grid.occupied_count() + self.store.item_trait_count()) as f32 / grid.cell_count() as f32;
        let selected = self.store.at(self.selector);
        let inputs = CapacityInputs {
            fullness,
            heating: selected.is_some_and(|e| e.has(TraitTag::Fire)) && !immune.contains(TraitTag::Fire),
            chilling: selected.is_some_and(|e| e.has(TraitTag::Ice)) && !immune.contains(TraitTag::Ice),
        };
        if self.capacity.update(dt, inputs) {
            self.game_over(LossReason::Collapse);
        }
    }

    fn update_orders(&mut self, dt: f32) {
        if self.orders.tick(dt).is_some() {
            let economy = self.config.economy;
            self.capacity.damage_hp(economy.order_expiry_penalty);
            if self.config.expiry_docks_reputation {
                self.reputation -= economy.reputation_on_expiry;
            }
            self.status = "ORDER EXPIRED".to_string();
            self.next_order();
        } else if self.orders.current().is_none() {
            self.next_order();
        }
    }
}

fn next_spread_delay<R: Rng + ?Sized>(config: &EngineConfig, rng: &mut R) -> f32 {
    let (min, max) = (config.hazards.spread_interval_min, config.hazards.spread_interval_max);
    if max > min { rng.random_range(min..=max) } else { min }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_stages;
    use crate::game::systems::orders::OrderSpec;
    use crate::game::types::ItemSubtype;

    /// Empty board with a single stage asking for plain bread.
    fn quiet_config() -> EngineConfig {
        let mut stages = default_stages();
        stages.truncate(1);
        stages[0].orders = vec![OrderSpec::new(ItemSubtype::Bread, TraitSet::empty())];
        stages[0].trait_tiles = 0;
        stages[0].orders_to_advance = 0;
        EngineConfig { seed: Some(7), stages, ..EngineConfig::default() }
    }

    fn free_non_delivery_cell(state: &GameState) -> Position {
        state
            .store()
            .grid()
            .free_positions()
            .find(|p| !state.is_delivery(*p) && state.store().can_place(*p, Size::TALL))
            .unwrap()
    }

    #[test]
    fn test_new_state_opens_first_order() {
        let state = GameState::new(quiet_config());
        assert_eq!(state.phase(), Phase::Running);
        assert_eq!(state.reputation(), 50);
        assert_eq!(state.delivery_zones().len(), 5);
        assert!(state.orders().current().is_some());
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_spawn_takes_conveyor_head_and_costs_energy() {
        let mut state = GameState::new(quiet_config());
        let cell = free_non_delivery_cell(&state);
        state.apply_intent(Intent::SelectCell(cell)).unwrap();
        state.apply_intent(Intent::SpawnOrSubmit).unwrap();
        let spawned = state.store().at(cell).unwrap();
        assert_eq!(spawned.subtype, ItemSubtype::Bread);
        assert_eq!(state.capacity().energy(), 95.0);
        assert_eq!(state.status(), "SPAWNED");

        // Occupied, not a delivery cell.
        assert_eq!(state.apply_intent(Intent::SpawnOrSubmit), Err(ActionError::NotDeliveryZone));
        assert_eq!(state.status(), "NOT DELIVERY");
    }

    #[test]
    fn test_delivery_on_zone_fulfils_order() {
        let mut state = GameState::new(quiet_config());
        let zone = state.delivery_zones()[0];
        state.store_mut().spawn(Entity::item(ItemKind::Bread, ItemSubtype::Bread), zone).unwrap();
        state.apply_intent(Intent::SelectCell(zone)).unwrap();
        state.apply_intent(Intent::SpawnOrSubmit).unwrap();
        assert_eq!(state.reputation(), 55);
        assert!(state.store().grid().is_free(zone));
        assert_eq!(state.orders().fulfilled_total(), 1);
        assert!(state.orders().current().is_some());
    }

    #[test]
    fn test_wrong_delivery_docks_reputation() {
        let mut state = GameState::new(quiet_config());
        let zone = state.delivery_zones()[0];
        state.apply_intent(Intent::SelectCell(zone)).unwrap();

        // A sealed box of the right subtype still matches.
        state.store_mut().spawn(Entity::item(ItemKind::PlainBox, ItemSubtype::Bread), zone).unwrap();
        state.apply_intent(Intent::SpawnOrSubmit).unwrap();
        assert_eq!(state.reputation(), 55);

        let mut knife = Entity::item(ItemKind::PlainBox, ItemSubtype::Knife);
        knife.size = Size::ONE;
        state.store_mut().spawn(knife, zone).unwrap();
        state.apply_intent(Intent::SpawnOrSubmit).unwrap();
        assert_eq!(state.reputation(), 54);
        assert_eq!(state.capacity().locks().hp, 6.0);
        assert_eq!(state.status(), "WRONG DELIVERY");
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_sword_cuts_adjacent_ghost_and_goes_on_cooldown() {
        let mut state = GameState::new(quiet_config());
        let sword = state
            .store_mut()
            .spawn(Entity::item(ItemKind::Sword, ItemSubtype::Knife), Position::new(0, 0))
            .unwrap();
        let ghost = state.store_mut().spawn(Entity::ghost(GhostFlavor::Ember, 5.0), Position::new(2, 0)).unwrap();
        state.apply_intent(Intent::SelectCell(Position::new(0, 0))).unwrap();
        state.apply_intent(Intent::UseSelected).unwrap();
        assert!(!state.store().contains(ghost));
        assert_eq!(state.status(), "CUT 1");
        assert!(state.store().get(sword).unwrap().active_cooldown > 0.0);
        assert!(matches!(state.apply_intent(Intent::UseSelected), Err(ActionError::OnCooldown(_))));
    }

    #[test]
    fn test_sword_miss_costs_hp() {
        let mut state = GameState::new(quiet_config());
        state.store_mut().spawn(Entity::item(ItemKind::Sword, ItemSubtype::Knife), Position::new(0, 0)).unwrap();
        state.apply_intent(Intent::SelectCell(Position::new(1, 0))).unwrap();
        state.apply_intent(Intent::UseSelected).unwrap();
        assert_eq!(state.status(), "SWING MISSED");
        assert_eq!(state.capacity().locks().hp, 3.0);
        assert_eq!(state.capacity().energy(), 92.0);
    }

    #[test]
    fn test_potion_grants_both_immunities_when_plain() {
        let mut state = GameState::new(quiet_config());
        let cell = free_non_delivery_cell(&state);
        state.store_mut().spawn(Entity::item(ItemKind::Potion, ItemSubtype::Bottle), cell).unwrap();
        state.apply_intent(Intent::SelectCell(cell)).unwrap();
        state.apply_intent(Intent::UseSelected).unwrap();
        let immunity = state.immunity();
        assert!(immunity.fire > 0.0 && immunity.ice > 0.0);
        assert!(state.store().grid().is_free(cell));
    }

    #[test]
    fn test_plain_box_is_not_usable() {
        let mut state = GameState::new(quiet_config());
        let cell = free_non_delivery_cell(&state);
        state.store_mut().spawn(Entity::item(ItemKind::PlainBox, ItemSubtype::Bread), cell).unwrap();
        state.apply_intent(Intent::SelectCell(cell)).unwrap();
        assert_eq!(state.apply_intent(Intent::UseSelected), Err(ActionError::NotUsable));
        assert_eq!(state.capacity().energy(), 100.0);
    }

    #[test]
    fn test_expiry_penalises_hp_and_regenerates() {
        let mut state = GameState::new(quiet_config());
        let lifetime = state.orders().current().unwrap().lifetime;
        let mut elapsed = 0.0;
        while elapsed < lifetime + 0.5 {
            state.tick(0.05);
            elapsed += 0.05;
        }
        assert_eq!(state.reputation(), 50);
        assert!(state.capacity().locks().hp >= 10.0);
        assert!(state.orders().current().is_some());
    }

    #[test]
    fn test_expiry_docks_reputation_when_configured() {
        let mut config = quiet_config();
        config.expiry_docks_reputation = true;
        let mut state = GameState::new(config);
        let lifetime = state.orders().current().unwrap().lifetime;
        let ticks = ((lifetime + 0.5) / 0.05) as usize;
        for _ in 0..ticks {
            state.tick(0.05);
        }
        assert_eq!(state.reputation(), 40);
    }
}
