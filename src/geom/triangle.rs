//! Möller–Trumbore ray-triangle intersection (spec.md §4.2).

use super::ray::Ray;
use super::vector::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Vec3<f64>,
    pub v1: Vec3<f64>,
    pub v2: Vec3<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f64,
    /// Barycentric coordinates (u, v); w = 1 - u - v.
    pub u: f64,
    pub v: f64,
}

impl Triangle {
    pub fn normal(&self) -> Vec3<f64> {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalise()
    }

    pub fn area(&self) -> f64 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length() * 0.5
    }

    /// Möller–Trumbore intersection. `epsilon` should be `1e-5 *
    /// scene_extent` per spec.md §4.2; parallel rays (`|det| < epsilon`)
    /// report a miss.
    pub fn intersect(&self, ray: &Ray, epsilon: f64, t_max: f64) -> Option<TriangleHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < epsilon {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(qvec) * inv_det;
        if t > epsilon && t < t_max {
            Some(TriangleHit { t, u, v })
        } else {
            None
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.area() <= f64::EPSILON
    }
}
