//! Geometry primitives and vector algebra: spec.md §4.1-4.2.

pub mod error;
pub mod rotation;
pub mod ray;
pub mod triangle;
pub mod vector;

pub use error::GeometryError;
pub use ray::{Aabb, Ray};
pub use rotation::Euler;
pub use triangle::{Triangle, TriangleHit};
pub use vector::{Vec2, Vec3};

/// Azimuth (from +x toward +y) and elevation (from the x-y plane toward +z)
/// of a direction vector, matching the coordinate convention in spec.md §6.
pub fn az_el(dir: Vec3<f64>) -> (f64, f64) {
    let phi = dir.y.atan2(dir.x);
    let el = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
    (phi, el)
}

/// Inverse of [`az_el`]: the unit direction vector at azimuth `phi`,
/// elevation `el`.
pub fn dir_from_az_el(phi: f64, el: f64) -> Vec3<f64> {
    Vec3::new(el.cos() * phi.cos(), el.cos() * phi.sin(), el.sin())
}
