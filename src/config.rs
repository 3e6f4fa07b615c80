//! Engine-wide configuration, replacing the source's process-wide mutable
//! free-tier flag with an explicit struct carried through every call
//! (spec.md §9 Design Notes).

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_BOUNCES, DEFAULT_MIN_BOUNCES, DEFAULT_RAY_BUDGET_PER_SNAPSHOT};

/// Which SBR bounce counts are permitted to contribute to the baseband
/// (spec.md §4.4, §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayFilter {
    pub min: u32,
    pub max: u32,
}

impl Default for RayFilter {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BOUNCES,
            max: DEFAULT_MAX_BOUNCES,
        }
    }
}

impl RayFilter {
    pub fn contains(&self, reflections: u32) -> bool {
        reflections >= self.min && reflections <= self.max
    }
}

/// A free-tier advisory limit, set once per engine instance
/// (`set_free_tier`, spec.md §6 operation 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTierLimit {
    pub max_mesh_faces: usize,
    pub max_point_targets: usize,
    pub max_channels: usize,
    pub max_rcs_targets: usize,
}

impl Default for FreeTierLimit {
    fn default() -> Self {
        Self {
            max_mesh_faces: crate::constants::FREE_TIER_MAX_MESH_FACES,
            max_point_targets: crate::constants::FREE_TIER_MAX_POINT_TARGETS,
            max_channels: crate::constants::FREE_TIER_MAX_CHANNELS,
            max_rcs_targets: crate::constants::FREE_TIER_MAX_RCS_TARGETS,
        }
    }
}

/// Engine-wide configuration carried explicitly through every `sim_*` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `None` means the free tier is not enforced.
    pub free_tier: Option<FreeTierLimit>,
    pub ray_filter: RayFilter,
    pub back_propagating: bool,
    /// Rays emitted per Tx channel per wavelength of the target's angular
    /// extent (spec.md §4.3).
    pub density: f64,
    pub ray_budget_per_snapshot: usize,
    /// Use the `gpu` feature's backend instead of the CPU fork-join path.
    pub use_gpu: bool,
    /// Receiver noise temperature, K, used by the noise-floor formula
    /// (spec.md §4.8).
    pub noise_temperature_k: f64,
    /// Calibration multiplier on the `k_B*T` noise-variance term (spec.md §9
    /// Open Questions: the source's noise formula omits this factor, so it is
    /// exposed here instead of guessing a fixed value).
    pub noise_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_tier: None,
            ray_filter: RayFilter::default(),
            back_propagating: false,
            density: 4.0,
            ray_budget_per_snapshot: DEFAULT_RAY_BUDGET_PER_SNAPSHOT,
            use_gpu: false,
            noise_temperature_k: crate::constants::DEFAULT_NOISE_TEMPERATURE_K,
            noise_scale: 1.0,
        }
    }
}

impl Config {
    pub fn with_free_tier(limit: FreeTierLimit) -> Self {
        Self {
            free_tier: Some(limit),
            ..Self::default()
        }
    }
}
