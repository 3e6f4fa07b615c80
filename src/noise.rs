//! Per-frame correlated receiver noise (spec.md §4.8), grounded on
//! `examples/markpruett571-RustRadarSim/src/simulation.rs`'s use of
//! `rand_distr::Normal` for baseband noise injection -- that crate's
//! dependency choice, not its architecture, is adopted here.

use ndarray::Array3;
use num_complex::Complex;
use rand::thread_rng;
use rand_distr::{Distribution, Normal};

use crate::config::Config;
use crate::constants::K_BOLTZMANN;
use crate::param::SlotShape;
use crate::scalar::Time;
use crate::waveform::{BasebandKind, Radar};

/// Draws the per-frame noise vectors and scatters them into `grid_noise`
/// (spec.md §4.8): for each frame, a length-`N` Gaussian vector per Rx
/// channel is drawn once, then sliced into every `(pulse, sample)` slot of
/// that frame at the matching receive time, so noise is correlated within a
/// pulse and across channels at equal receive time.
pub fn fill_noise(
    grid_noise: &mut Array3<Complex<f64>>,
    radar: &Radar,
    timestamps: &Array3<Time>,
    shape: SlotShape,
    config: &Config,
) {
    let num_tx = radar.num_tx_channels();
    let num_rx = radar.num_rx_channels();
    let num_frames = shape.0 / (num_tx * num_rx).max(1);
    let fs = radar.rx.fs_hz;

    let sigma2 = K_BOLTZMANN
        * config.noise_temperature_k
        * radar.rx.noise_bandwidth_hz
        * 10f64.powf(radar.rx.rf_gain_db / 10.0)
        * 10f64.powf(radar.rx.baseband_gain_db / 10.0).powi(2)
        * radar.rx.load_resistor_ohm
        * config.noise_scale;
    let sigma = sigma2.max(0.0).sqrt();
    let dist = Normal::new(0.0, sigma).expect("noise sigma must be finite and non-negative");
    let mut rng = thread_rng();

    for frame in 0..num_frames {
        let frame_chan0 = frame * num_tx * num_rx;
        let frame_ts = timestamps.slice(ndarray::s![frame_chan0..frame_chan0 + num_tx * num_rx, .., ..]);
        let t_min = frame_ts.iter().cloned().fold(f64::INFINITY, f64::min);
        let t_max = frame_ts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let n = (((t_max - t_min) * fs).ceil() as usize + 1).max(1);

        for rx_idx in 0..num_rx {
            let noise_re: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let noise_im: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let scale = std::f64::consts::FRAC_1_SQRT_2;

            for tx_idx in 0..num_tx {
                let chan = frame_chan0 + tx_idx * num_rx + rx_idx;
                for pulse in 0..shape.1 {
                    for sample in 0..shape.2 {
                        let t = timestamps[[chan, pulse, sample]];
                        let i = (((t - t_min) * fs).round() as isize).clamp(0, n as isize - 1) as usize;
                        let value = match radar.rx.baseband_kind {
                            BasebandKind::Real => Complex::new(noise_re[i], 0.0),
                            BasebandKind::Complex => Complex::new(noise_re[i] * scale, noise_im[i] * scale),
                        };
                        grid_noise[[chan, pulse, sample]] = value;
                    }
                }
            }
        }
    }
}
