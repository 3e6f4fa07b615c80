//! Antenna patterns: parallel `(angles, gains)` arrays with binary-search
//! plus linear interpolation, pre-normalised to peak 1 (spec.md §9 Design
//! Notes).

use crate::error::{Error, Result};
use crate::math::{bracket, lerp};

/// A one-dimensional antenna gain pattern over angle, linear (not dB) gain,
/// pre-normalised so the peak value is 1.
#[derive(Debug, Clone)]
pub struct PatternAxis {
    angles_rad: Vec<f64>,
    gains_linear: Vec<f64>,
}

impl PatternAxis {
    /// `gains_dbi` is converted to linear and normalised to unit peak.
    pub fn from_dbi(angles_rad: Vec<f64>, gains_dbi: Vec<f64>) -> Result<Self> {
        if angles_rad.len() != gains_dbi.len() || angles_rad.is_empty() {
            return Err(Error::invalid_input(
                "antenna pattern angle/gain arrays must be equal length and non-empty",
            ));
        }
        for w in angles_rad.windows(2) {
            if w[1] <= w[0] {
                return Err(Error::invalid_input(
                    "antenna pattern angles must be strictly increasing",
                ));
            }
        }
        let linear: Vec<f64> = gains_dbi.iter().map(|g| 10f64.powf(g / 10.0)).collect();
        let peak = linear.iter().cloned().fold(0.0, f64::max);
        if peak <= 0.0 {
            return Err(Error::invalid_input("antenna pattern gain is all-zero"));
        }
        let normalised: Vec<f64> = linear.iter().map(|g| g / peak).collect();
        Ok(Self {
            angles_rad,
            gains_linear: normalised,
        })
    }

    pub fn is_all_zero(&self) -> bool {
        self.gains_linear.iter().all(|&g| g == 0.0)
    }

    /// Bilinear-ready 1-D lookup: binary search + linear interpolation.
    pub fn gain_at(&self, angle_rad: f64) -> f64 {
        let (lo, hi) = bracket(&self.angles_rad, angle_rad);
        if lo == hi {
            return self.gains_linear[lo];
        }
        let t = (angle_rad - self.angles_rad[lo]) / (self.angles_rad[hi] - self.angles_rad[lo]);
        lerp(self.gains_linear[lo], self.gains_linear[hi], t)
    }
}

/// A full azimuth/elevation antenna pattern. Elevation angles are stored
/// flipped and mapped `θ = π/2 - el` for monotonic lookup (spec.md §3).
#[derive(Debug, Clone)]
pub struct AntennaPattern {
    azimuth: PatternAxis,
    elevation: PatternAxis,
    peak_gain_dbi: f64,
}

impl AntennaPattern {
    pub fn new(
        az_angles_rad: Vec<f64>,
        az_gain_dbi: Vec<f64>,
        el_angles_rad: Vec<f64>,
        el_gain_dbi: Vec<f64>,
        peak_gain_dbi: f64,
    ) -> Result<Self> {
        let azimuth = PatternAxis::from_dbi(az_angles_rad, az_gain_dbi)?;
        // Map elevation angle el -> theta = pi/2 - el, then re-sort ascending
        // so lookup stays monotonic (spec.md §3).
        let theta: Vec<f64> = el_angles_rad
            .iter()
            .map(|el| std::f64::consts::FRAC_PI_2 - el)
            .collect();
        let mut pairs: Vec<(f64, f64)> = theta.into_iter().zip(el_gain_dbi).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let (theta_sorted, gain_sorted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let elevation = PatternAxis::from_dbi(theta_sorted, gain_sorted)?;
        if azimuth.is_all_zero() || elevation.is_all_zero() {
            return Err(Error::invalid_input("antenna pattern is all-zero"));
        }
        Ok(Self {
            azimuth,
            elevation,
            peak_gain_dbi,
        })
    }

    /// Isotropic unit-gain pattern, for callers that supply no measured
    /// pattern.
    pub fn isotropic(peak_gain_dbi: f64) -> Self {
        Self {
            azimuth: PatternAxis {
                angles_rad: vec![-std::f64::consts::PI, std::f64::consts::PI],
                gains_linear: vec![1.0, 1.0],
            },
            elevation: PatternAxis {
                angles_rad: vec![0.0, std::f64::consts::PI],
                gains_linear: vec![1.0, 1.0],
            },
            peak_gain_dbi,
        }
    }

    /// Total gain (linear, not dB) at the given azimuth `phi` and elevation
    /// `el`, combining the peak boresight gain with the normalised
    /// az/el pattern shapes.
    pub fn gain_linear(&self, phi: f64, el: f64) -> f64 {
        let theta = std::f64::consts::FRAC_PI_2 - el;
        let peak_linear = 10f64.powf(self.peak_gain_dbi / 10.0);
        peak_linear * self.azimuth.gain_at(phi) * self.elevation.gain_at(theta)
    }

    pub fn gain_db(&self, phi: f64, el: f64) -> f64 {
        10.0 * self.gain_linear(phi, el).log10()
    }

    pub fn peak_gain_dbi(&self) -> f64 {
        self.peak_gain_dbi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn isotropic_pattern_has_constant_gain() {
        let pat = AntennaPattern::isotropic(10.0);
        assert_abs_diff_eq!(pat.gain_db(0.3, 0.1), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pat.gain_db(-1.0, 0.5), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn all_zero_pattern_is_rejected() {
        let res = AntennaPattern::new(
            vec![-1.0, 1.0],
            vec![f64::NEG_INFINITY, f64::NEG_INFINITY],
            vec![-1.0, 1.0],
            vec![0.0, 0.0],
            0.0,
        );
        assert!(res.is_err());
    }
}
