//! The baseband grid and snapshot/fidelity machinery: spec.md §3, §4.7.

use ndarray::Array3;
use num_complex::Complex;
use strum_macros::EnumString;

use crate::error::{Error, Result};
use crate::scalar::Time;

/// How often the scene geometry is re-traced (spec.md §4.7). Between
/// snapshots the ray-tracer pose is held constant; inside a snapshot the
/// baseband integrator still evaluates the exact per-sample pose for the
/// Doppler-phase term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Fidelity {
    Frame,
    Pulse,
    Sample,
}

impl Fidelity {
    pub fn parse(s: &str) -> Result<Self> {
        use std::str::FromStr;
        Fidelity::from_str(s)
            .map_err(|_| Error::invalid_input(format!("unknown fidelity level '{s}'")))
    }
}

/// A `(time, frame_idx, tx_idx, pulse_idx, sample_idx)` tuple selecting a
/// point in the time grid at which ray tracing is re-evaluated (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub time: Time,
    pub frame_idx: usize,
    pub tx_idx: usize,
    pub pulse_idx: usize,
    pub sample_idx: usize,
}

/// Builds the snapshot list for the given fidelity over a slot-grid shape
/// `(frames*tx, pulses, samples)` and per-slot timestamps (spec.md §4.7).
pub fn build_snapshots(
    fidelity: Fidelity,
    num_frames: usize,
    num_tx: usize,
    num_pulses: usize,
    num_samples: usize,
    timestamp_at: impl Fn(usize, usize, usize, usize) -> Time,
) -> Vec<Snapshot> {
    let mut snapshots = Vec::new();
    for frame_idx in 0..num_frames {
        for tx_idx in 0..num_tx {
            match fidelity {
                Fidelity::Frame => snapshots.push(Snapshot {
                    time: timestamp_at(frame_idx, tx_idx, 0, 0),
                    frame_idx,
                    tx_idx,
                    pulse_idx: 0,
                    sample_idx: 0,
                }),
                Fidelity::Pulse => {
                    for pulse_idx in 0..num_pulses {
                        snapshots.push(Snapshot {
                            time: timestamp_at(frame_idx, tx_idx, pulse_idx, 0),
                            frame_idx,
                            tx_idx,
                            pulse_idx,
                            sample_idx: 0,
                        });
                    }
                }
                Fidelity::Sample => {
                    for pulse_idx in 0..num_pulses {
                        for sample_idx in 0..num_samples {
                            snapshots.push(Snapshot {
                                time: timestamp_at(frame_idx, tx_idx, pulse_idx, sample_idx),
                                frame_idx,
                                tx_idx,
                                pulse_idx,
                                sample_idx,
                            });
                        }
                    }
                }
            }
        }
    }
    snapshots
}

/// Dense `[frames*channels_total, pulses, samples]` complex baseband buffer
/// plus same-shaped noise/interference buffers (spec.md §3).
pub struct BasebandGrid {
    pub baseband: Array3<Complex<f64>>,
    pub noise: Array3<Complex<f64>>,
    pub interference: Array3<Complex<f64>>,
}

impl BasebandGrid {
    pub fn zeros(shape: (usize, usize, usize)) -> Self {
        Self {
            baseband: Array3::zeros(shape),
            noise: Array3::zeros(shape),
            interference: Array3::zeros(shape),
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.baseband.dim()
    }

    /// Splits the flat `(channel, pulse, sample)` first axis into `(frame,
    /// tx, rx)` given channel ordering `rx` fastest (spec.md §3).
    pub fn channel_index(frame: usize, tx: usize, rx: usize, num_tx: usize, num_rx: usize) -> usize {
        (frame * num_tx + tx) * num_rx + rx
    }
}
