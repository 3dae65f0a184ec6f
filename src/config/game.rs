/// Game configuration constants.
///
/// This module defines the main gameplay parameters such as grid dimensions,
/// tick rate, trait timers and hazard pacing. All durations are in seconds
/// unless the name says otherwise.

/// Side length of the square grid.
pub const GRID_SIZE: usize = 10;

/// Fixed simulation step driven by the session actor (milliseconds).
pub const TICK_MILLIS: u64 = 50;

/// Number of ticks between two unsolicited snapshot broadcasts.
pub const BROADCAST_EVERY_TICKS: u64 = 10;

/// Number of delivery cells picked at session start.
pub const DELIVERY_ZONE_COUNT: usize = 5;

/// Number of upcoming items visible on the conveyor.
pub const CONVEYOR_LEN: usize = 3;

/// Probability that a conveyor item arrives as a sealed plain box.
pub const PLAIN_BOX_CHANCE: f64 = 0.25;

/// Fire burns out after this long unless re-applied.
pub const FIRE_DURATION: f32 = 5.0;

/// Dwell time next to a trait tile before its trait is absorbed.
pub const ABSORB_SECONDS: f32 = 2.0;

/// Bounds of the randomized interval between global trait spread attempts.
pub const SPREAD_INTERVAL_MIN: f32 = 14.0;
pub const SPREAD_INTERVAL_MAX: f32 = 16.0;

/// Probability that a due spread attempt actually happens.
pub const SPREAD_CHANCE: f64 = 0.6;

/// `hp` lock accrued per second while the selection stands in an aura.
pub const FIRE_AURA_DAMAGE_PER_SEC: f32 = 2.0;
pub const ICE_AURA_DAMAGE_PER_SEC: f32 = 1.5;

/// Seconds between two ghost steps (the coarse ghost tick).
pub const GHOST_STEP_SECONDS: f32 = 1.5;

/// Ghosts neither step nor haunt during this window after spawning.
pub const GHOST_SPAWN_GRACE: f32 = 2.0;

/// Cooldown between two haunt pulses of the same ghost.
pub const GHOST_HAUNT_COOLDOWN: f32 = 3.0;

/// Sentient/haunted items get a chance to wander this often.
pub const SENTIENT_TICK_SECONDS: f32 = 1.0;

/// Probability that a sentient item wanders on a sentient tick.
pub const SENTIENT_MOVE_CHANCE: f64 = 0.5;

/// Cooldown applied to a sword after a swing.
pub const SWORD_COOLDOWN: f32 = 2.0;

/// Duration of the fire/ice immunity granted by drinking a potion.
pub const IMMUNITY_SECONDS: f32 = 8.0;

/// Reputation at session start, the losing floor and per-order deltas.
pub const START_REPUTATION: i32 = 50;
pub const MIN_REPUTATION: i32 = 0;
pub const REPUTATION_ON_SUCCESS: i32 = 5;
pub const REPUTATION_ON_FAILURE: i32 = 1;
pub const REPUTATION_ON_EXPIRY: i32 = 10;
