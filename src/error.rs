//! Error type for all scatterfield-related errors. This is the *only* error
//! enum that is publicly visible, matching the teacher's `src/error.rs`
//! aggregation-of-submodule-errors discipline.

use thiserror::Error;

use crate::geom::GeometryError;

/// The *only* publicly visible error from scatterfield.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch, empty mesh, non-finite floats, unknown enum value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A free-tier advisory limit (`Config::free_tier_limit`) was exceeded.
    /// Detected before any expensive work starts (spec.md §7).
    #[error("tier limit exceeded: {0}")]
    TierLimitExceeded(String),

    /// A required ray frame could not be built.
    #[error(transparent)]
    GeometryDegenerate(#[from] GeometryError),

    /// Numerical or allocation failure; fatal to the run. Already-written
    /// baseband cells are left intact but the partial result is not
    /// returned (spec.md §4.12).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn tier_limit(msg: impl Into<String>) -> Self {
        Error::TierLimitExceeded(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// A non-fatal condition returned alongside a (possibly partial) result.
/// Currently only raised when the ray tracer exhausts its hard per-snapshot
/// ray cap (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayBudgetExhausted {
    pub snapshot_index: usize,
    pub rays_emitted: usize,
    pub ray_budget: usize,
}

impl std::fmt::Display for RayBudgetExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ray budget exhausted at snapshot {}: emitted {} of a {} budget",
            self.snapshot_index, self.rays_emitted, self.ray_budget
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
