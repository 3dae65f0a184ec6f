/// Capacity (energy budget) configuration constants.
///
/// Locks are expressed in energy units and subtracted from [`E_MAX_BASE`].

/// Total energy available with no locks engaged.
pub const E_MAX_BASE: f32 = 100.0;

/// Grid fullness fraction at which the weight lock starts to ramp.
pub const WEIGHT_START: f32 = 0.35;

/// Grid fullness fraction at which the weight lock reaches [`WEIGHT_MAX`].
pub const WEIGHT_END: f32 = 0.85;

/// Largest weight lock.
pub const WEIGHT_MAX: f32 = 40.0;

/// Heat/cold lock build and recovery rates (per second).
pub const HEAT_BUILD: f32 = 6.0;
pub const HEAT_RECOVER: f32 = 4.0;
pub const COLD_BUILD: f32 = 5.0;
pub const COLD_RECOVER: f32 = 4.0;

/// Seconds without spending before energy starts regenerating.
pub const REGEN_DELAY: f32 = 1.5;

/// Energy regenerated per second once regeneration kicks in.
pub const REGEN_RATE: f32 = 8.0;

/// The economy collapses when the usable ceiling drops to this fraction of the base.
pub const COLLAPSE_FRACTION: f32 = 0.1;

/// Energy cost of player actions.
pub const SPAWN_COST: f32 = 5.0;
pub const SHOVE_COST: f32 = 2.0;
pub const USE_COST: f32 = 8.0;

/// `hp` lock adjustments driven by orders and item use.
pub const ORDER_HEAL: f32 = 8.0;
pub const ORDER_FAILURE_PENALTY: f32 = 6.0;
pub const ORDER_EXPIRY_PENALTY: f32 = 10.0;
pub const BREAD_HEAL: f32 = 10.0;
pub const USE_MISS_PENALTY: f32 = 3.0;
