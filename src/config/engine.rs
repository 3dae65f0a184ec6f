//! Runtime engine configuration.
//!
//! [`EngineConfig::default`] is built from the constants in `game`,
//! `capacity` and `progression`. A JSON file may override any field; missing
//! fields keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::capacity as cap;
use crate::config::game as g;
use crate::config::progression::{default_stages, StageSpec};
use crate::game::types::Direction;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Hazard pacing: traits, auras, ghosts and sentient items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub absorb_seconds: f32,
    pub spread_interval_min: f32,
    pub spread_interval_max: f32,
    pub spread_chance: f64,
    pub fire_aura_damage: f32,
    pub ice_aura_damage: f32,
    pub ghost_step_seconds: f32,
    pub ghost_spawn_grace: f32,
    pub ghost_haunt_cooldown: f32,
    pub sentient_tick_seconds: f32,
    pub sentient_move_chance: f64,
    pub sword_cooldown: f32,
    pub immunity_seconds: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            absorb_seconds: g::ABSORB_SECONDS,
            spread_interval_min: g::SPREAD_INTERVAL_MIN,
            spread_interval_max: g::SPREAD_INTERVAL_MAX,
            spread_chance: g::SPREAD_CHANCE,
            fire_aura_damage: g::FIRE_AURA_DAMAGE_PER_SEC,
            ice_aura_damage: g::ICE_AURA_DAMAGE_PER_SEC,
            ghost_step_seconds: g::GHOST_STEP_SECONDS,
            ghost_spawn_grace: g::GHOST_SPAWN_GRACE,
            ghost_haunt_cooldown: g::GHOST_HAUNT_COOLDOWN,
            sentient_tick_seconds: g::SENTIENT_TICK_SECONDS,
            sentient_move_chance: g::SENTIENT_MOVE_CHANCE,
            sword_cooldown: g::SWORD_COOLDOWN,
            immunity_seconds: g::IMMUNITY_SECONDS,
        }
    }
}

/// Capacity budget, action costs and reputation rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub e_max_base: f32,
    pub weight_start: f32,
    pub weight_end: f32,
    pub weight_max: f32,
    pub heat_build: f32,
    pub heat_recover: f32,
    pub cold_build: f32,
    pub cold_recover: f32,
    pub regen_delay: f32,
    pub regen_rate: f32,
    pub collapse_fraction: f32,
    pub spawn_cost: f32,
    pub shove_cost: f32,
    pub use_cost: f32,
    pub order_heal: f32,
    pub order_failure_penalty: f32,
    pub order_expiry_penalty: f32,
    pub bread_heal: f32,
    pub use_miss_penalty: f32,
    pub start_reputation: i32,
    pub min_reputation: i32,
    pub reputation_on_success: i32,
    pub reputation_on_failure: i32,
    pub reputation_on_expiry: i32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            e_max_base: cap::E_MAX_BASE,
            weight_start: cap::WEIGHT_START,
            weight_end: cap::WEIGHT_END,
            weight_max: cap::WEIGHT_MAX,
            heat_build: cap::HEAT_BUILD,
            heat_recover: cap::HEAT_RECOVER,
            cold_build: cap::COLD_BUILD,
            cold_recover: cap::COLD_RECOVER,
            regen_delay: cap::REGEN_DELAY,
            regen_rate: cap::REGEN_RATE,
            collapse_fraction: cap::COLLAPSE_FRACTION,
            spawn_cost: cap::SPAWN_COST,
            shove_cost: cap::SHOVE_COST,
            use_cost: cap::USE_COST,
            order_heal: cap::ORDER_HEAL,
            order_failure_penalty: cap::ORDER_FAILURE_PENALTY,
            order_expiry_penalty: cap::ORDER_EXPIRY_PENALTY,
            bread_heal: cap::BREAD_HEAL,
            use_miss_penalty: cap::USE_MISS_PENALTY,
            start_reputation: g::START_REPUTATION,
            min_reputation: g::MIN_REPUTATION,
            reputation_on_success: g::REPUTATION_ON_SUCCESS,
            reputation_on_failure: g::REPUTATION_ON_FAILURE,
            reputation_on_expiry: g::REPUTATION_ON_EXPIRY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid_size: usize,
    pub delivery_zones: usize,
    /// Fixed RNG seed; a random one is drawn and logged when absent.
    pub seed: Option<u64>,
    /// Shoving an item past this edge delivers it. `None` disables edge delivery.
    pub submit_edge: Option<Direction>,
    /// Whether an expired order also costs reputation.
    pub expiry_docks_reputation: bool,
    /// Whether ghost steps may shove items out of the way.
    pub ghosts_push_items: bool,
    pub hazards: HazardConfig,
    pub economy: EconomyConfig,
    pub stages: Vec<StageSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: g::GRID_SIZE,
            delivery_zones: g::DELIVERY_ZONE_COUNT,
            seed: None,
            submit_edge: Some(Direction::Up),
            expiry_docks_reputation: false,
            ghosts_push_items: false,
            hazards: HazardConfig::default(),
            economy: EconomyConfig::default(),
            stages: default_stages(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if !(3..=64).contains(&self.grid_size) {
            return invalid("grid_size must be between 3 and 64");
        }
        if self.delivery_zones >= self.grid_size * self.grid_size {
            return invalid("delivery_zones must leave free cells");
        }
        if self.stages.is_empty() || self.stages.iter().any(|s| s.orders.is_empty()) {
            return invalid("every stage needs at least one order");
        }
        if self.hazards.spread_interval_min > self.hazards.spread_interval_max {
            return invalid("spread_interval_min exceeds spread_interval_max");
        }
        if !(0.0..=1.0).contains(&self.hazards.spread_chance) || !(0.0..=1.0).contains(&self.hazards.sentient_move_chance) {
            return invalid("probabilities must lie in [0, 1]");
        }
        if self.economy.e_max_base <= 0.0 || self.economy.weight_end <= self.economy.weight_start {
            return invalid("capacity base must be positive and weight_end above weight_start");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"seed": 42, "expiry_docks_reputation": true, "economy": {"spawn_cost": 1.0}}"#)
            .unwrap();
        assert_eq!(config.seed, Some(42));
        assert!(config.expiry_docks_reputation);
        assert_eq!(config.economy.spawn_cost, 1.0);
        assert_eq!(config.economy.e_max_base, cap::E_MAX_BASE);
        assert_eq!(config.grid_size, g::GRID_SIZE);
    }

    #[test]
    fn test_invalid_grid_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"grid_size": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(matches!(EngineConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }
}
