//! Shared radar/target builders for the end-to-end scenario tests (spec.md
//! §8). Kept separate from the crate's own unit-test helpers since these are
//! assembled into full scenarios rather than single-module fixtures.

use num_complex::Complex;
use scatterfield::geom::Vec3;

pub fn isotropic_pattern() -> scatterfield::antenna::AntennaPattern {
    scatterfield::antenna::AntennaPattern::isotropic(0.0)
}

pub fn unit_pol() -> Vec3<Complex<f64>> {
    Vec3::new(Complex::new(1.0, 0.0), Complex::new(0.0, 0.0), Complex::new(0.0, 0.0))
}

/// A single-channel, single-pulse CW radar at the origin.
pub fn cw_radar(freq_hz: f64, tx_power_dbm: f64, fs_hz: f64) -> scatterfield::waveform::Radar {
    use scatterfield::waveform::*;
    let pattern = isotropic_pattern();
    let pol = unit_pol();
    Radar {
        tx: Transmitter {
            channels: vec![TxChannel {
                location: Vec3::zero(),
                polarization: pol,
                pattern: pattern.clone(),
                grid_spacing_rad: 0.02,
                delay_s: 0.0,
                pulse_mod: vec![Complex::new(1.0, 0.0)],
                arb_mod: ArbWaveformMod::disabled(),
            }],
            tx_power_dbm,
            waveform: WaveformTable::cw(freq_hz, 1e-3),
            freq_offset_hz: vec![0.0],
            pulse_start_time_s: vec![0.0],
            frame_start_time_s: vec![0.0],
            phase_noise: None,
        },
        rx: Receiver {
            channels: vec![RxChannel { location: Vec3::zero(), polarization: pol, pattern }],
            fs_hz,
            rf_gain_db: 0.0,
            load_resistor_ohm: 50.0,
            baseband_gain_db: 0.0,
            noise_bandwidth_hz: 1e6,
            baseband_kind: BasebandKind::Complex,
        },
        motion: scatterfield::motion::MotionModel::stationary(Vec3::zero()),
    }
}

/// A single-channel CW radar sampling `num_pulses` pulses at the given PRI,
/// for slow-time Doppler scenarios (spec.md §8 scenario S2).
pub fn cw_radar_multi_pulse(freq_hz: f64, tx_power_dbm: f64, fs_hz: f64, num_pulses: usize, pri_s: f64) -> scatterfield::waveform::Radar {
    let mut radar = cw_radar(freq_hz, tx_power_dbm, fs_hz);
    radar.tx.pulse_start_time_s = (0..num_pulses).map(|p| p as f64 * pri_s).collect();
    radar.tx.channels[0].pulse_mod = vec![Complex::new(1.0, 0.0); num_pulses];
    radar
}

/// A single-channel FMCW radar (spec.md §8 scenario S3).
pub fn fmcw_radar(f0_hz: f64, f1_hz: f64, sweep_s: f64, tx_power_dbm: f64, fs_hz: f64) -> scatterfield::waveform::Radar {
    use scatterfield::waveform::*;
    let mut radar = cw_radar(f0_hz, tx_power_dbm, fs_hz);
    radar.tx.waveform = WaveformTable::fmcw_linear(f0_hz, f1_hz, sweep_s);
    radar
}

/// A flat PEC plate of the given square side length, centred at `origin`,
/// facing +z.
pub fn flat_plate(side: f64, origin: Vec3<f64>) -> scatterfield::mesh::Target {
    use scatterfield::mesh::{Material, Mesh, Target};
    let h = (side / 2.0) as f32;
    let points = vec![
        Vec3::new(-h, -h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, h, 0.0),
        Vec3::new(-h, h, 0.0),
    ];
    let cells = vec![[0, 1, 2], [0, 2, 3]];
    let mesh = Mesh::new(points, cells).unwrap();
    Target::new(mesh, Vec3::zero(), scatterfield::motion::MotionModel::stationary(origin), Material::PEC)
}

/// Naive DFT magnitude at bin `k` of a length-`n` complex sequence, used by
/// the slow-time and range-FFT scenario tests in place of a fast transform
/// (the sequences involved are a few hundred samples at most).
pub fn dft_bin(samples: &[Complex<f64>], k: f64) -> f64 {
    let n = samples.len() as f64;
    let mut acc = Complex::new(0.0, 0.0);
    for (i, s) in samples.iter().enumerate() {
        let phase = -2.0 * std::f64::consts::PI * k * i as f64 / n;
        acc += s * Complex::new(phase.cos(), phase.sin());
    }
    acc.norm()
}

/// Index of the DFT bin (`0..n`) with the largest magnitude.
pub fn dft_peak_bin(samples: &[Complex<f64>]) -> usize {
    let n = samples.len();
    (0..n)
        .map(|k| (k, dft_bin(samples, k as f64)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}
