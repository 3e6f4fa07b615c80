//! Rays and axis-aligned bounding boxes.

use super::vector::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3<f64>,
    pub direction: Vec3<f64>,
}

impl Ray {
    pub fn new(origin: Vec3<f64>, direction: Vec3<f64>) -> Self {
        Self {
            origin,
            direction: direction.normalise(),
        }
    }

    pub fn at(&self, t: f64) -> Vec3<f64> {
        self.origin + self.direction * t
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3<f64>,
    pub max: Vec3<f64>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Vec3<f64>]) -> Self {
        let mut b = Self::empty();
        for &p in points {
            b.grow(p);
        }
        b
    }

    pub fn grow(&mut self, p: Vec3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(mut self, other: Self) -> Self {
        self.grow(other.min);
        self.grow(other.max);
        self
    }

    pub fn centroid(&self) -> Vec3<f64> {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3<f64> {
        self.max - self.min
    }

    /// Index of the axis along which the box is longest (0=x, 1=y, 2=z).
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Scene extent used to scale the ray-triangle intersection epsilon
    /// (spec.md §4.2: `ε = 1e-5 · scene_extent`).
    pub fn diagonal_length(&self) -> f64 {
        self.extent().length()
    }

    /// Slab-test ray/box intersection; returns the entry `t` if the ray hits
    /// the box within `[t_min, t_max]`.
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<f64> {
        let mut tmin = t_min;
        let mut tmax = t_max;
        for axis in 0..3 {
            let (o, d, lo, hi) = match axis {
                0 => (ray.origin.x, ray.direction.x, self.min.x, self.max.x),
                1 => (ray.origin.y, ray.direction.y, self.min.y, self.max.y),
                _ => (ray.origin.z, ray.direction.z, self.min.z, self.max.z),
            };
            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv_d = 1.0 / d;
            let mut t0 = (lo - o) * inv_d;
            let mut t1 = (hi - o) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmax <= tmin {
                return None;
            }
        }
        Some(tmin.max(t_min))
    }
}
