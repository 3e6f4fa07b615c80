//! Per-slot parameter grids (spec.md §9 Design Notes): every target field is
//! either a single value held constant across a frame, or a dense grid of
//! per-`(frame·channel, pulse, sample)` overrides. Materialising a `Constant`
//! to a dense grid is deferred until the slot-grid shape is known.

use ndarray::Array3;

/// Shape of the slot grid: `(frames * channels_total, pulses, samples_per_pulse)`.
pub type SlotShape = (usize, usize, usize);

#[derive(Debug, Clone)]
pub enum ParamGrid<T> {
    Constant(T),
    Grid(Array3<T>),
}

impl<T: Clone> ParamGrid<T> {
    /// Returns the value at a given slot, materialising nothing: a constant
    /// is read directly, a grid is indexed.
    pub fn at(&self, shape: SlotShape, idx: (usize, usize, usize)) -> T {
        match self {
            ParamGrid::Constant(v) => v.clone(),
            ParamGrid::Grid(g) => {
                debug_assert_eq!(g.dim(), shape);
                g[[idx.0, idx.1, idx.2]].clone()
            }
        }
    }

    /// Materialise into a dense grid of the given shape, cloning the
    /// constant value into every slot if this is `Constant`.
    pub fn materialise(&self, shape: SlotShape) -> Array3<T> {
        match self {
            ParamGrid::Constant(v) => Array3::from_elem(shape, v.clone()),
            ParamGrid::Grid(g) => {
                debug_assert_eq!(g.dim(), shape);
                g.clone()
            }
        }
    }

    pub fn validate_shape(&self, shape: SlotShape) -> Result<(), String> {
        if let ParamGrid::Grid(g) = self {
            if g.dim() != shape {
                return Err(format!(
                    "grid shape {:?} does not match slot-grid shape {:?}",
                    g.dim(),
                    shape
                ));
            }
        }
        Ok(())
    }
}
