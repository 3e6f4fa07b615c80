//! Useful physical constants.
//!
//! All constants are double precision; the engine does as much of its
//! geometry and delay arithmetic as possible in `f64` before demoting to `f32`
//! for the bulk field-strength accumulation, matching the wavelength-vs-PRI
//! scale mismatch noted in spec.md §3.

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light in vacuum, m/s.
pub const VEL_C: f64 = 299_792_458.0;

/// Boltzmann's constant, J/K.
pub const K_BOLTZMANN: f64 = 1.380_649e-23;

/// Default receiver noise temperature, K (used when the caller supplies no
/// explicit `noise_scale`; spec.md §9 Open Questions).
pub const DEFAULT_NOISE_TEMPERATURE_K: f64 = 290.0;

/// Antenna-pattern rays more than this many dB below the pattern peak are
/// dropped during ray generation (spec.md §4.3).
pub const RAY_GAIN_FLOOR_DB: f64 = -40.0;

/// Default maximum SBR bounce count (spec.md §4.4).
pub const DEFAULT_MAX_BOUNCES: u32 = 10;

/// Default minimum SBR bounce count for a contributing ray (spec.md §4.4,
/// §9 Open Questions: a zero-bounce "ray" contributes nothing by default).
pub const DEFAULT_MIN_BOUNCES: u32 = 1;

/// Free-tier advisory limits (spec.md §6, operation 4).
pub const FREE_TIER_MAX_MESH_FACES: usize = 8;
pub const FREE_TIER_MAX_POINT_TARGETS: usize = 2;
pub const FREE_TIER_MAX_CHANNELS: usize = 1;
pub const FREE_TIER_MAX_RCS_TARGETS: usize = 3;

/// Numerical edge-case epsilon scale factor for ray-triangle intersection
/// (spec.md §4.2: `ε = 1e-5 · scene_extent`).
pub const RAY_EPSILON_SCALE: f64 = 1e-5;

/// Maximum rays permitted per snapshot before `RayBudgetExhausted` fires
/// (spec.md §7).
pub const DEFAULT_RAY_BUDGET_PER_SNAPSHOT: usize = 2_000_000;
