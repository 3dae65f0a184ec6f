//! Capacity / economy model.
//!
//! The player has an energy pool `E` bounded by an effective maximum: the
//! configured base minus four locks (hp, weight, heat, cold). Every lock lives
//! in `[0, base]`. When the effective maximum shrinks to a small fraction of
//! the base the economy collapses and the run is over.

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::EconomyConfig;
use crate::game::error::ActionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Locks {
    pub hp: f32,
    pub weight: f32,
    pub heat: f32,
    pub cold: f32,
}

impl Locks {
    pub fn total(&self) -> f32 {
        self.hp + self.weight + self.heat + self.cold
    }

    fn all_mut(&mut self) -> [(&'static str, &mut f32); 4] {
        [
            ("hp", &mut self.hp),
            ("weight", &mut self.weight),
            ("heat", &mut self.heat),
            ("cold", &mut self.cold),
        ]
    }
}

/// Per-tick pressure on the economy, gathered by the game state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapacityInputs {
    /// `(filled cells + active item traits) / cells`.
    pub fullness: f32,
    /// The selected entity burns and the player is not fire-immune.
    pub heating: bool,
    /// The selected entity is frozen and the player is not ice-immune.
    pub chilling: bool,
}

/// Read-only breakdown for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityView {
    pub energy: f32,
    pub max_base: f32,
    pub max_effective: f32,
    pub locks: Locks,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Capacity {
    rules: EconomyConfig,
    energy: f32,
    locks: Locks,
    since_spend: f32,
    collapsed: bool,
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl Capacity {
    pub fn new(rules: EconomyConfig) -> Self {
        Self {
            rules,
            energy: rules.e_max_base,
            locks: Locks::default(),
            since_spend: 0.0,
            collapsed: false,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn max_base(&self) -> f32 {
        self.rules.e_max_base
    }

    pub fn locks(&self) -> Locks {
        self.locks
    }

    pub fn max_effective(&self) -> f32 {
        (self.rules.e_max_base - self.locks.total()).max(0.0)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        self.energy + f32::EPSILON >= cost
    }

    /// Pay for an action. Leaves the pool untouched when it cannot cover `cost`.
    pub fn spend(&mut self, cost: f32) -> Result<(), ActionError> {
        if !self.can_afford(cost) {
            return Err(ActionError::InsufficientEnergy {
                needed: cost,
                available: self.energy,
            });
        }
        self.energy = (self.energy - cost).max(0.0);
        self.since_spend = 0.0;
        Ok(())
    }

    /// Raise the hp lock. Energy above the shrunken maximum is lost at once.
    pub fn damage_hp(&mut self, amount: f32) {
        self.locks.hp = (self.locks.hp + amount).clamp(0.0, self.rules.e_max_base);
        self.energy = self.energy.min(self.max_effective());
    }

    pub fn heal_hp(&mut self, amount: f32) {
        self.locks.hp = (self.locks.hp - amount).clamp(0.0, self.rules.e_max_base);
    }

    /// Advance locks, regeneration and the collapse check by `dt` seconds.
    /// Returns `true` on the tick the economy collapses.
    pub fn update(&mut self, dt: f32, inputs: CapacityInputs) -> bool {
        let r = self.rules;
        self.locks.weight = smoothstep(r.weight_start, r.weight_end, inputs.fullness) * r.weight_max;
        let heat_rate = if inputs.heating { r.heat_build } else { -r.heat_recover };
        let cold_rate = if inputs.chilling { r.cold_build } else { -r.cold_recover };
        self.locks.heat += heat_rate * dt;
        self.locks.cold += cold_rate * dt;

        let base = r.e_max_base;
        let mut ceiling_hit = false;
        for (name, lock) in self.locks.all_mut() {
            if !lock.is_finite() {
                error!("[Capacity] {} lock went non-finite, forcing collapse", name);
                *lock = base;
                ceiling_hit = true;
            }
            *lock = lock.clamp(0.0, base);
            if *lock >= base {
                ceiling_hit = true;
            }
        }

        self.since_spend += dt;
        if self.since_spend >= r.regen_delay {
            self.energy += r.regen_rate * dt;
        }
        let max_eff = self.max_effective();
        self.energy = if self.energy.is_finite() { self.energy.clamp(0.0, max_eff) } else { 0.0 };
        self.settle_collapse(ceiling_hit)
    }

    /// Collapse check for hp changes made between ticks. Returns `true` when
    /// this call collapses the economy.
    pub fn check_collapse(&mut self) -> bool {
        let base = self.rules.e_max_base;
        let l = self.locks;
        let ceiling_hit = [l.hp, l.weight, l.heat, l.cold].iter().any(|lock| *lock >= base);
        self.settle_collapse(ceiling_hit)
    }

    fn settle_collapse(&mut self, ceiling_hit: bool) -> bool {
        let base = self.rules.e_max_base;
        let max_eff = self.max_effective();
        let was_collapsed = self.collapsed;
        self.collapsed = was_collapsed || ceiling_hit || max_eff <= self.rules.collapse_fraction * base;
        if self.collapsed && !was_collapsed {
            info!(
                "[Capacity] Collapse: effective max {:.1} of {:.1} (locks {:?})",
                max_eff, base, self.locks
            );
            return true;
        }
        false
    }

    pub fn view(&self) -> CapacityView {
        CapacityView {
            energy: self.energy,
            max_base: self.rules.e_max_base,
            max_effective: self.max_effective(),
            locks: self.locks,
            collapsed: self.collapsed,
        }
    }
}
