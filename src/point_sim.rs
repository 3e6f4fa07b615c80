//! Point simulator: closed-form baseband contribution of point targets
//! (spec.md §4.6), grounded on the teacher's `src/model/mod.rs::model_points`
//! (iterate over the parallel axis, scale by wavelength, accumulate a
//! phase-rotated complex contribution).

use ndarray::Array3;
use num_complex::Complex;
use rayon::prelude::*;

use crate::constants::VEL_C;
use crate::geom::az_el;
use crate::grid::BasebandGrid;
use crate::math::cexp;
use crate::mesh::PointTarget;
use crate::motion::{Pose, PoseGrid};
use crate::param::SlotShape;
use crate::scalar::Time;
use crate::waveform::{BasebandKind, Radar};

/// Per-slot Tx/Rx channel world poses needed by the point simulator and the
/// interference simulator.
pub struct ChannelPoses {
    pub tx: Vec<Array3<crate::geom::Vec3<f64>>>,
    pub rx: Vec<Array3<crate::geom::Vec3<f64>>>,
    /// Radar-body attitude at each slot, shared by every channel, kept
    /// around so antenna-pattern lookups can rotate the line-of-sight into
    /// the body frame (spec.md §6).
    pub rotation: Array3<crate::geom::Euler>,
}

impl ChannelPoses {
    pub fn build(radar: &Radar, radar_poses: &PoseGrid, shape: SlotShape) -> Self {
        let tx = radar
            .tx
            .channels
            .iter()
            .map(|ch| {
                Array3::from_shape_fn(shape, |idx| {
                    let Pose { location, rotation } = radar_poses.pose_at(idx);
                    location + rotation.rotate(ch.location)
                })
            })
            .collect();
        let rx = radar
            .rx
            .channels
            .iter()
            .map(|ch| {
                Array3::from_shape_fn(shape, |idx| {
                    let Pose { location, rotation } = radar_poses.pose_at(idx);
                    location + rotation.rotate(ch.location)
                })
            })
            .collect();
        let rotation = Array3::from_shape_fn(shape, |idx| radar_poses.pose_at(idx).rotation);
        Self { tx, rx, rotation }
    }
}

/// Adds every point target's contribution into `grid.baseband`, for every
/// Tx x Rx channel pair and every time slot (spec.md §4.6). `timestamps` and
/// `chan_poses` must share `shape`.
pub fn accumulate_point_targets(
    grid: &mut BasebandGrid,
    radar: &Radar,
    chan_poses: &ChannelPoses,
    points: &[PointTarget],
    timestamps: &Array3<Time>,
    shape: SlotShape,
) {
    let num_tx = radar.num_tx_channels();
    let num_rx = radar.num_rx_channels();
    let num_pulses = shape.1;
    let num_samples = shape.2;

    // Outer fork-join loop over the baseband channel axis (spec.md §5).
    grid.baseband
        .axis_iter_mut(ndarray::Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(chan, mut chan_slab)| {
            let frame = chan / (num_tx * num_rx);
            let tx_idx = (chan / num_rx) % num_tx;
            let rx_idx = chan % num_rx;
            let tx_ch = &radar.tx.channels[tx_idx];
            let rx_ch = &radar.rx.channels[rx_idx];

            for pulse in 0..num_pulses {
                let t_pulse_start = radar.tx.pulse_start_time_s[pulse.min(radar.tx.num_pulses() - 1)];
                let t_frame_start = radar.tx.frame_start_time_s[frame.min(radar.tx.frame_start_time_s.len() - 1)];
                for sample in 0..num_samples {
                    let idx = (chan, pulse, sample);
                    let t_sample = timestamps[[chan, pulse, sample]];
                    let p_tx = chan_poses.tx[tx_idx][idx];
                    let p_rx = chan_poses.rx[rx_idx][idx];
                    let body_rot = chan_poses.rotation[idx];

                    let mut acc = Complex::new(0.0, 0.0);
                    for point in points {
                        let velocity = point.velocity.at(shape, idx);
                        let p_point = point.location.at(shape, idx) + velocity * t_sample;
                        let r_tx_vec = p_point - p_tx;
                        let r_rx_vec = p_point - p_rx;
                        let r_tx = r_tx_vec.length();
                        let r_rx = r_rx_vec.length();
                        if r_tx <= 0.0 || r_rx <= 0.0 {
                            continue;
                        }
                        let tau = (r_tx + r_rx) / VEL_C;

                        let t_rel = t_sample - tau - t_pulse_start - t_frame_start;
                        let freq = radar.tx.waveform.freq_at(t_rel)
                            + radar.tx.freq_offset_hz[pulse.min(radar.tx.freq_offset_hz.len() - 1)];
                        let lambda = VEL_C / freq;

                        let (phi_tx, el_tx) = az_el(body_rot.inverse_rotate(r_tx_vec.normalise()));
                        let (phi_rx, el_rx) = az_el(body_rot.inverse_rotate(r_rx_vec.normalise()));
                        let g_tx = tx_ch.pattern.gain_linear(phi_tx, el_tx);
                        let g_rx = rx_ch.pattern.gain_linear(phi_rx, el_rx);

                        let sigma = crate::mesh::PointTarget::rcs_linear(point.rcs_dbsm.at(shape, idx));
                        let phase_offset = point.phase_deg.at(shape, idx).to_radians();

                        let amp = (radar.tx.tx_power_w() * g_tx * g_rx * sigma * lambda * lambda
                            / ((4.0 * std::f64::consts::PI).powi(3) * r_tx * r_tx * r_rx * r_rx))
                            .sqrt();

                        let phase = -2.0 * std::f64::consts::PI * freq * tau + phase_offset;

                        let pulse_mod = tx_ch.pulse_mod_at(pulse);
                        let arb_mod = tx_ch.arb_mod.multiplier_at(t_rel);
                        let phase_noise = radar
                            .tx
                            .phase_noise
                            .as_ref()
                            .map(|pn| pn[[chan, pulse, sample]])
                            .unwrap_or(Complex::new(1.0, 0.0));

                        acc += amp * cexp(phase) * pulse_mod * arb_mod * phase_noise;
                    }
                    let cell = &mut chan_slab[[pulse, sample]];
                    *cell += match radar.rx.baseband_kind {
                        BasebandKind::Real => Complex::new(acc.re, 0.0),
                        BasebandKind::Complex => acc,
                    };
                }
            }
        });
}
