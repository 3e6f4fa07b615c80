//! Fixed-size 2/3-component vector algebra over real and complex scalars.

use num_complex::Complex;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A two-component vector, used for antenna-pattern angle pairs and 2-D
/// scratch geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> Vec2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// A three-component vector. Used for all world-space geometry (`T = L`) and,
/// with `T = Complex<L>`, for polarisation and radiated E-fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> Vec3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T> Vec3<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>,
{
    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    pub fn hadamard(self, rhs: Self) -> Self {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
            z: self.z * rhs.z,
        }
    }
}

impl<T: Float> Vec3<T> {
    pub fn zero() -> Self {
        Self {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
        }
    }

    pub fn length_sq(self) -> T {
        self.dot(self)
    }

    pub fn length(self) -> T {
        self.length_sq().sqrt()
    }

    /// Returns a unit vector in `self`'s direction. Degenerate (zero-length)
    /// input returns the zero vector rather than `NaN`.
    pub fn normalise(self) -> Self {
        let len = self.length();
        if len <= T::epsilon() {
            Self::zero()
        } else {
            self / len
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Vec3<f64> {
    pub fn to_f32(self) -> Vec3<f32> {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl Vec3<f32> {
    pub fn to_f64(self) -> Vec3<f64> {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl<T: Float> Vec3<Complex<T>> {
    /// Magnitude of a complex-valued vector, i.e. `sqrt(sum |component|^2)`.
    pub fn norm(self) -> T {
        (self.x.norm_sqr() + self.y.norm_sqr() + self.z.norm_sqr()).sqrt()
    }

    pub fn is_all_zero(self) -> bool {
        self.x.norm_sqr() == T::zero()
            && self.y.norm_sqr() == T::zero()
            && self.z.norm_sqr() == T::zero()
    }
}

impl<T: Copy + Add<Output = T>> Add for Vec3<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl<T: Copy + Sub<Output = T>> Sub for Vec3<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl<T: Copy + Neg<Output = T>> Neg for Vec3<T> {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl<T: Copy + Mul<Output = T>> Mul<T> for Vec3<T> {
    type Output = Self;
    fn mul(self, rhs: T) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl<T: Copy + Div<Output = T>> Div<T> for Vec3<T> {
    type Output = Self;
    fn div(self, rhs: T) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cross_product_is_perpendicular() {
        let a = Vec3::new(1.0_f64, 0.0, 0.0);
        let b = Vec3::new(0.0_f64, 1.0, 0.0);
        let c = a.cross(b);
        assert_abs_diff_eq!(c.dot(a), 0.0);
        assert_abs_diff_eq!(c.dot(b), 0.0);
        assert_abs_diff_eq!(c.z, 1.0);
    }

    #[test]
    fn normalise_zero_vector_stays_zero() {
        let z: Vec3<f64> = Vec3::zero();
        assert_eq!(z.normalise(), Vec3::zero());
    }

    #[test]
    fn normalise_unit_length() {
        let v = Vec3::new(3.0_f64, 4.0, 0.0);
        assert_abs_diff_eq!(v.normalise().length(), 1.0, epsilon = 1e-12);
    }
}
