//! Motion sampler: spec.md §4.1. Produces, for every slot, the world-space
//! pose of a body given piecewise-constant velocity/rotation-rate and
//! optional per-slot overrides.

use ndarray::Array3;

use crate::geom::{Euler, Vec3};
use crate::param::{ParamGrid, SlotShape};
use crate::scalar::Time;

/// A body's time-resolved motion description: constant-or-grid location,
/// velocity, rotation and rotation-rate.
#[derive(Debug, Clone)]
pub struct MotionModel {
    pub location: ParamGrid<Vec3<f64>>,
    pub velocity: ParamGrid<Vec3<f64>>,
    /// Euler angles, radians.
    pub rotation: ParamGrid<Euler>,
    /// Euler rates, radians/s.
    pub rotation_rate: ParamGrid<Euler>,
}

impl MotionModel {
    pub fn stationary(location: Vec3<f64>) -> Self {
        Self {
            location: ParamGrid::Constant(location),
            velocity: ParamGrid::Constant(Vec3::zero()),
            rotation: ParamGrid::Constant(Euler::default()),
            rotation_rate: ParamGrid::Constant(Euler::default()),
        }
    }
}

/// A materialised world-space pose at one slot.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub location: Vec3<f64>,
    pub rotation: Euler,
}

/// Dense per-slot poses for one body, over the whole slot grid.
pub struct PoseGrid {
    shape: SlotShape,
    location: Array3<Vec3<f64>>,
    rotation: Array3<Euler>,
}

impl PoseGrid {
    /// Builds the pose grid given the body's motion model and the absolute
    /// timestamp at each slot (`H` precision). Where `location`/`rotation`
    /// are supplied as a pre-computed grid, that grid is used verbatim and
    /// the companion rate field is ignored for that component (spec.md
    /// §4.1).
    pub fn build(motion: &MotionModel, timestamps: &Array3<Time>) -> Self {
        let shape = timestamps.dim();
        let t0 = timestamps.iter().cloned().fold(f64::INFINITY, f64::min);

        let location = match &motion.location {
            ParamGrid::Grid(g) => g.clone(),
            ParamGrid::Constant(loc0) => {
                let vel = match &motion.velocity {
                    ParamGrid::Constant(v) => *v,
                    ParamGrid::Grid(_) => Vec3::zero(),
                };
                Array3::from_shape_fn(shape, |idx| {
                    let dt = timestamps[idx] - t0;
                    *loc0 + vel * dt
                })
            }
        };

        let rotation = match &motion.rotation {
            ParamGrid::Grid(g) => g.clone(),
            ParamGrid::Constant(rot0) => {
                let rate = match &motion.rotation_rate {
                    ParamGrid::Constant(r) => *r,
                    ParamGrid::Grid(_) => Euler::default(),
                };
                Array3::from_shape_fn(shape, |idx| {
                    let dt = timestamps[idx] - t0;
                    *rot0 + rate * dt
                })
            }
        };

        Self {
            shape,
            location,
            rotation,
        }
    }

    pub fn pose_at(&self, idx: (usize, usize, usize)) -> Pose {
        Pose {
            location: self.location[[idx.0, idx.1, idx.2]],
            rotation: self.rotation[[idx.0, idx.1, idx.2]],
        }
    }

    pub fn shape(&self) -> SlotShape {
        self.shape
    }
}

/// Transforms a mesh-local vertex (relative to `origin`) into world space
/// for the given pose: subtract origin, rotate, translate (spec.md §4.1).
pub fn vertex_to_world(local_vertex: Vec3<f64>, origin: Vec3<f64>, pose: &Pose) -> Vec3<f64> {
    let centred = local_vertex - origin;
    pose.rotation.rotate(centred) + pose.location
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_velocity_moves_linearly() {
        let motion = MotionModel {
            location: ParamGrid::Constant(Vec3::new(10.0, 0.0, 0.0)),
            velocity: ParamGrid::Constant(Vec3::new(-30.0, 0.0, 0.0)),
            rotation: ParamGrid::Constant(Euler::default()),
            rotation_rate: ParamGrid::Constant(Euler::default()),
        };
        let shape = (1, 1, 3);
        let timestamps = Array3::from_shape_fn(shape, |(_, _, s)| s as f64 * 1e-4);
        let poses = PoseGrid::build(&motion, &timestamps);
        let p0 = poses.pose_at((0, 0, 0));
        let p2 = poses.pose_at((0, 0, 2));
        assert_abs_diff_eq!(p0.location.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p2.location.x, 10.0 - 30.0 * 2e-4, epsilon = 1e-9);
    }

    #[test]
    fn vertex_transform_applies_origin_then_rotation_then_translation() {
        let pose = Pose {
            location: Vec3::new(5.0, 0.0, 0.0),
            rotation: Euler::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
        };
        let local = Vec3::new(1.0, 0.0, 0.0);
        let world = vertex_to_world(local, Vec3::zero(), &pose);
        assert_abs_diff_eq!(world.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(world.y, 1.0, epsilon = 1e-9);
    }
}
