//! Euler-angle rotation composition, Z-Y-X extrinsic (yaw, then pitch, then
//! roll), matching spec.md §4.1.

use super::vector::Vec3;

/// A yaw-pitch-roll attitude, radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Euler {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_degrees(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> Self {
        Self {
            yaw: yaw_deg.to_radians(),
            pitch: pitch_deg.to_radians(),
            roll: roll_deg.to_radians(),
        }
    }

    /// Rotation matrix for R = Rz(yaw) * Ry(pitch) * Rx(roll), i.e. apply
    /// roll first, then pitch, then yaw, when used as `R * v`.
    pub fn to_matrix(self) -> [[f64; 3]; 3] {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let (sr, cr) = self.roll.sin_cos();

        [
            [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
            [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
            [-sp, cp * sr, cp * cr],
        ]
    }

    pub fn rotate(self, v: Vec3<f64>) -> Vec3<f64> {
        let m = self.to_matrix();
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Applies the transpose (= inverse, since `to_matrix` is orthogonal) of
    /// the rotation, taking a world-space vector into the body frame.
    pub fn inverse_rotate(self, v: Vec3<f64>) -> Vec3<f64> {
        let m = self.to_matrix();
        Vec3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }
}

impl std::ops::Add for Euler {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            yaw: self.yaw + rhs.yaw,
            pitch: self.pitch + rhs.pitch,
            roll: self.roll + rhs.roll,
        }
    }
}

impl std::ops::Mul<f64> for Euler {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self {
            yaw: self.yaw * s,
            pitch: self.pitch * s,
            roll: self.roll * s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn yaw_90_maps_x_to_y() {
        let e = Euler::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        let v = e.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn identity_rotation_preserves_vector() {
        let e = Euler::default();
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = e.rotate(v);
        assert_abs_diff_eq!(r.x, v.x, epsilon = 1e-12);
        assert_abs_diff_eq!(r.y, v.y, epsilon = 1e-12);
        assert_abs_diff_eq!(r.z, v.z, epsilon = 1e-12);
    }
}
