//! Radar-on-radar interference (spec.md §4.9): direct coupling of another
//! radar's Tx waveform into this radar's Rx chain, reusing `point_sim`'s
//! kernel shape with the interferer's Tx standing in for a scattering point.
//!
//! The written spec sets `R_rx = 0, sigma = 1` in the point-target radar
//! equation to turn the two-way link into a one-way link; taken literally
//! that divides by zero, so this collapses to the equivalent one-way Friis
//! transmission equation instead: `a = sqrt(P_tx * G_tx * G_rx * lambda^2 /
//! ((4*pi)^2 * R^2))`, one-way delay `tau = R / c`, same per-pulse
//! modulation and waveform-table lookup as the interferer's own Tx channel.

use ndarray::Array3;
use num_complex::Complex;
use rayon::prelude::*;

use crate::constants::VEL_C;
use crate::geom::az_el;
use crate::grid::BasebandGrid;
use crate::math::cexp;
use crate::motion::{Pose, PoseGrid};
use crate::param::SlotShape;
use crate::point_sim::ChannelPoses;
use crate::scalar::Time;
use crate::waveform::{BasebandKind, Radar};

/// Adds `interferer`'s Tx waveform into `victim`'s `grid.interference`
/// buffer at every Rx channel and time slot (spec.md §4.9). `victim_poses`
/// must share `shape` with `timestamps`.
pub fn accumulate_interference(
    grid: &mut BasebandGrid,
    victim: &Radar,
    victim_poses: &ChannelPoses,
    interferer: &Radar,
    timestamps: &Array3<Time>,
    shape: SlotShape,
) {
    let num_tx = victim.num_tx_channels();
    let num_rx = victim.num_rx_channels();
    let num_pulses = shape.1;
    let num_samples = shape.2;

    let interferer_poses = PoseGrid::build(&interferer.motion, timestamps);
    let interferer_tx_world: Vec<Array3<crate::geom::Vec3<f64>>> = interferer
        .tx
        .channels
        .iter()
        .map(|ch| {
            Array3::from_shape_fn(shape, |idx| {
                let Pose { location, rotation } = interferer_poses.pose_at(idx);
                location + rotation.rotate(ch.location)
            })
        })
        .collect();
    let interferer_rot = Array3::from_shape_fn(shape, |idx| interferer_poses.pose_at(idx).rotation);

    grid.interference
        .axis_iter_mut(ndarray::Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(chan, mut chan_slab)| {
            let rx_idx = chan % num_rx;
            let rx_ch = &victim.rx.channels[rx_idx];

            for pulse in 0..num_pulses {
                let t_pulse_start = interferer.tx.pulse_start_time_s[pulse.min(interferer.tx.num_pulses() - 1)];
                let t_frame_start = interferer.tx.frame_start_time_s[0];
                for sample in 0..num_samples {
                    let idx = (chan, pulse, sample);
                    let t_sample = timestamps[[chan, pulse, sample]];
                    let p_rx = victim_poses.rx[rx_idx][idx];
                    let rx_body_rot = victim_poses.rotation[idx];

                    let mut acc = Complex::new(0.0, 0.0);
                    for (itx_idx, itx_ch) in interferer.tx.channels.iter().enumerate() {
                        let p_tx = interferer_tx_world[itx_idx][idx];
                        let r_vec = p_tx - p_rx;
                        let r = r_vec.length();
                        if r <= 0.0 {
                            continue;
                        }
                        let tau = r / VEL_C;

                        let t_rel = t_sample - tau - t_pulse_start - t_frame_start;
                        let freq = interferer.tx.waveform.freq_at(t_rel)
                            + interferer.tx.freq_offset_hz[pulse.min(interferer.tx.freq_offset_hz.len() - 1)];
                        let lambda = VEL_C / freq;

                        let (phi_rx, el_rx) = az_el(rx_body_rot.inverse_rotate(r_vec.normalise()));
                        let itx_rot = interferer_rot[idx];
                        let (phi_tx, el_tx) = az_el(itx_rot.inverse_rotate((-r_vec).normalise()));
                        let g_rx = rx_ch.pattern.gain_linear(phi_rx, el_rx);
                        let g_tx = itx_ch.pattern.gain_linear(phi_tx, el_tx);

                        let amp = (interferer.tx.tx_power_w() * g_tx * g_rx * lambda * lambda
                            / ((4.0 * std::f64::consts::PI).powi(2) * r * r))
                            .sqrt();
                        let phase = -2.0 * std::f64::consts::PI * freq * tau;

                        let pulse_mod = itx_ch.pulse_mod_at(pulse);
                        let arb_mod = itx_ch.arb_mod.multiplier_at(t_rel);
                        acc += amp * cexp(phase) * pulse_mod * arb_mod;
                    }
                    let cell = &mut chan_slab[[pulse, sample]];
                    *cell += match victim.rx.baseband_kind {
                        BasebandKind::Real => Complex::new(acc.re, 0.0),
                        BasebandKind::Complex => acc,
                    };
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antenna::AntennaPattern;
    use crate::geom::Vec3;
    use crate::motion::MotionModel;
    use crate::waveform::{ArbWaveformMod, Receiver, Transmitter, TxChannel, WaveformTable};

    fn isotropic_radar(power_dbm: f64, location: Vec3<f64>) -> Radar {
        let pattern = AntennaPattern::isotropic(0.0);
        let pol = Vec3::new(Complex::new(1.0, 0.0), Complex::new(0.0, 0.0), Complex::new(0.0, 0.0));
        Radar {
            tx: Transmitter {
                channels: vec![TxChannel {
                    location: Vec3::zero(),
                    polarization: pol,
                    pattern: pattern.clone(),
                    grid_spacing_rad: 0.05,
                    delay_s: 0.0,
                    pulse_mod: vec![Complex::new(1.0, 0.0)],
                    arb_mod: ArbWaveformMod::disabled(),
                }],
                tx_power_dbm: power_dbm,
                waveform: WaveformTable::fmcw_linear(24e9, 24.05e9, 1e-3),
                freq_offset_hz: vec![0.0],
                pulse_start_time_s: vec![0.0],
                frame_start_time_s: vec![0.0],
                phase_noise: None,
            },
            rx: Receiver {
                channels: vec![crate::waveform::RxChannel {
                    location: Vec3::zero(),
                    polarization: pol,
                    pattern,
                }],
                fs_hz: 1e6,
                rf_gain_db: 0.0,
                load_resistor_ohm: 50.0,
                baseband_gain_db: 0.0,
                noise_bandwidth_hz: 1e6,
                baseband_kind: BasebandKind::Complex,
            },
            motion: MotionModel::stationary(location),
        }
    }

    #[test]
    fn interference_contributes_nonzero_energy() {
        let victim = isotropic_radar(0.0, Vec3::zero());
        let interferer = isotropic_radar(30.0, Vec3::new(100.0, 0.0, 0.0));
        let shape = (1, 1, 8);
        let timestamps = Array3::from_shape_fn(shape, |(_, _, s)| s as f64 * 1e-6);
        let victim_poses = PoseGrid::build(&victim.motion, &timestamps);
        let chan_poses = ChannelPoses::build(&victim, &victim_poses, shape);
        let mut grid = BasebandGrid::zeros(shape);
        accumulate_interference(&mut grid, &victim, &chan_poses, &interferer, &timestamps, shape);
        assert!(grid.interference.iter().any(|c| c.norm() > 0.0));
    }
}
