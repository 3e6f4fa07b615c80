//! LiDAR point cloud (spec.md §6 operation 3): reuses the same BVH and
//! motion machinery as `raytrace`/`rcs`, described only via the
//! `sim_lidar` operation it exposes (spec.md §4 "Scene/LiDAR functions").

use ndarray::Array3;

use crate::constants::RAY_EPSILON_SCALE;
use crate::error::{Error, Result};
use crate::geom::{dir_from_az_el, Ray, Vec3};
use crate::mesh::Target;
use crate::motion::PoseGrid;
use crate::raytrace::SceneSnapshot;
use crate::scalar::Time;

/// A stationary LiDAR sensor: one world-space position emitting one ray per
/// `(phi[i], theta[i])` pair.
pub struct Lidar {
    pub position: Vec3<f64>,
    pub phi: Vec<f64>,
    pub theta: Vec<f64>,
}

/// One emitted ray's `(origin, direction)` and, if it struck the scene, the
/// first-hit world-space point (spec.md §6 operation 3).
#[derive(Debug, Clone, Copy)]
pub struct LidarReturn {
    pub origin: Vec3<f64>,
    pub direction: Vec3<f64>,
    pub hit: Option<Vec3<f64>>,
}

/// Traces every `lidar.phi`/`lidar.theta` ray against `targets` at
/// `frame_time`, stopping each at its first hit (spec.md §6 operation 3).
pub fn sim_lidar(lidar: &Lidar, targets: &[Target], frame_time: Time) -> Result<Vec<LidarReturn>> {
    if lidar.phi.len() != lidar.theta.len() {
        return Err(Error::invalid_input(
            "sim_lidar requires lidar.phi and lidar.theta to be the same length",
        ));
    }

    let static_time: Array3<Time> = Array3::from_elem((1, 1, 1), frame_time);
    let poses = targets
        .iter()
        .map(|t| PoseGrid::build(&t.motion, &static_time).pose_at((0, 0, 0)))
        .collect::<Vec<_>>();
    let scene = SceneSnapshot::build(targets, &poses);
    let epsilon = RAY_EPSILON_SCALE * scene.scene_extent().max(1.0);

    Ok(lidar
        .phi
        .iter()
        .zip(&lidar.theta)
        .map(|(&phi, &theta)| {
            let direction = dir_from_az_el(phi, theta);
            let ray = Ray::new(lidar.position, direction);
            let hit = scene
                .intersect(&ray, epsilon, epsilon, f64::INFINITY)
                .map(|h| ray.at(h.t));
            LidarReturn {
                origin: lidar.position,
                direction,
                hit,
            }
        })
        .collect())
}
