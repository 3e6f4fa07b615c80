//! Waveform / Tx / Rx model: spec.md §3 (`TxChannel`, `RxChannel`,
//! `Transmitter`, `Receiver`).

use num_complex::Complex;

use crate::antenna::AntennaPattern;
use crate::error::{Error, Result};
use crate::geom::Vec3;
use crate::math::{bracket, lerp};
use crate::scalar::Time;

/// Intra-pulse arbitrary-waveform modulation overlay (spec.md §3): a
/// complex multiplier applied while `t[i] <= (t_sample - t_pulse_start) <
/// t[i+1]`.
#[derive(Debug, Clone)]
pub struct ArbWaveformMod {
    pub enabled: bool,
    pub t: Vec<f64>,
    pub var: Vec<Complex<f64>>,
}

impl ArbWaveformMod {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            t: Vec::new(),
            var: Vec::new(),
        }
    }

    /// Multiplier at intra-pulse time `t_rel = t_sample - t_pulse_start`.
    pub fn multiplier_at(&self, t_rel: f64) -> Complex<f64> {
        if !self.enabled || self.t.is_empty() {
            return Complex::new(1.0, 0.0);
        }
        match self.t.binary_search_by(|probe| probe.partial_cmp(&t_rel).unwrap()) {
            Ok(i) => self.var[i.min(self.var.len() - 1)],
            Err(0) => self.var[0],
            Err(i) => self.var[(i - 1).min(self.var.len() - 1)],
        }
    }
}

/// Piecewise-linear frequency-vs-intra-pulse-time waveform table
/// (spec.md §3: `f[k], t[k]`).
#[derive(Debug, Clone)]
pub struct WaveformTable {
    t: Vec<Time>,
    f: Vec<Time>,
}

impl WaveformTable {
    pub fn new(t: Vec<Time>, f: Vec<Time>) -> Result<Self> {
        if t.len() != f.len() || t.len() < 2 {
            return Err(Error::invalid_input(
                "waveform table needs at least two matching (t, f) points",
            ));
        }
        for w in t.windows(2) {
            if w[1] <= w[0] {
                return Err(Error::invalid_input(
                    "waveform table times must be strictly increasing",
                ));
            }
        }
        Ok(Self { t, f })
    }

    /// Constant-carrier CW waveform.
    pub fn cw(freq_hz: f64, pulse_width_s: f64) -> Self {
        Self {
            t: vec![0.0, pulse_width_s],
            f: vec![freq_hz, freq_hz],
        }
    }

    /// Linear FM chirp from `f0` to `f1` over `duration_s`.
    pub fn fmcw_linear(f0: f64, f1: f64, duration_s: f64) -> Self {
        Self {
            t: vec![0.0, duration_s],
            f: vec![f0, f1],
        }
    }

    /// Instantaneous frequency at intra-pulse time `t_rel`, clamped to the
    /// table's domain.
    pub fn freq_at(&self, t_rel: f64) -> f64 {
        let t_clamped = t_rel.clamp(self.t[0], *self.t.last().unwrap());
        let (lo, hi) = bracket(&self.t, t_clamped);
        if lo == hi {
            return self.f[lo];
        }
        let frac = (t_clamped - self.t[lo]) / (self.t[hi] - self.t[lo]);
        lerp(self.f[lo], self.f[hi], frac)
    }

    /// Slope of the (first linear segment of the) sweep, Hz/s -- used by the
    /// round-trip-delay testable property in spec.md §8.
    pub fn slope_hz_per_s(&self) -> f64 {
        (self.f[self.f.len() - 1] - self.f[0]) / (self.t[self.t.len() - 1] - self.t[0])
    }
}

/// A single transmit antenna channel (spec.md §3).
#[derive(Debug, Clone)]
pub struct TxChannel {
    pub location: Vec3<f64>,
    pub polarization: Vec3<Complex<f64>>,
    pub pattern: AntennaPattern,
    /// Ray-emission angular grid spacing, radians (spec.md §4.3).
    pub grid_spacing_rad: f64,
    pub delay_s: f64,
    /// Per-pulse complex modulation, length = number of pulses.
    pub pulse_mod: Vec<Complex<f64>>,
    pub arb_mod: ArbWaveformMod,
}

impl TxChannel {
    pub fn pulse_mod_at(&self, pulse: usize) -> Complex<f64> {
        self.pulse_mod
            .get(pulse)
            .copied()
            .unwrap_or(Complex::new(1.0, 0.0))
    }
}

/// A single receive antenna channel (spec.md §3).
#[derive(Debug, Clone)]
pub struct RxChannel {
    pub location: Vec3<f64>,
    pub polarization: Vec3<Complex<f64>>,
    pub pattern: AntennaPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasebandKind {
    Real,
    Complex,
}

/// The Tx side of a `Radar` (spec.md §3).
#[derive(Debug, Clone)]
pub struct Transmitter {
    pub channels: Vec<TxChannel>,
    pub tx_power_dbm: f64,
    pub waveform: WaveformTable,
    /// Per-pulse frequency offset, Hz.
    pub freq_offset_hz: Vec<f64>,
    pub pulse_start_time_s: Vec<Time>,
    pub frame_start_time_s: Vec<Time>,
    /// `[frame*channel, pulse, sample]` complex phase-noise gain, if any.
    pub phase_noise: Option<ndarray::Array3<Complex<f64>>>,
}

impl Transmitter {
    pub fn tx_power_w(&self) -> f64 {
        10f64.powf((self.tx_power_dbm - 30.0) / 10.0)
    }

    pub fn num_pulses(&self) -> usize {
        self.pulse_start_time_s.len()
    }
}

/// The Rx side of a `Radar` (spec.md §3).
#[derive(Debug, Clone)]
pub struct Receiver {
    pub channels: Vec<RxChannel>,
    pub fs_hz: f64,
    pub rf_gain_db: f64,
    pub load_resistor_ohm: f64,
    pub baseband_gain_db: f64,
    pub noise_bandwidth_hz: f64,
    pub baseband_kind: BasebandKind,
}

/// A radar: a Transmitter, a Receiver, and body motion (spec.md §3). The
/// radar's own origin is the coordinate-system origin; channel positions
/// are body-relative.
pub struct Radar {
    pub tx: Transmitter,
    pub rx: Receiver,
    pub motion: crate::motion::MotionModel,
}

impl Radar {
    pub fn num_tx_channels(&self) -> usize {
        self.tx.channels.len()
    }

    pub fn num_rx_channels(&self) -> usize {
        self.rx.channels.len()
    }

    /// `channels_total = |TxChannels| * |RxChannels|` (spec.md §3).
    pub fn channels_total(&self) -> usize {
        self.num_tx_channels() * self.num_rx_channels()
    }
}
