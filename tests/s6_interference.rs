//! Scenario S6 (spec.md §8): two identical radars sharing one waveform, the
//! interferer at (100,0,0), no targets. The baseband buffer must stay zero
//! (noise disabled); the interference buffer should carry a linear-FM beat
//! whose frequency is the propagation-delay-induced offset between the two
//! sweeps (`slope * tau`, `tau = R/c`).

mod common;

use scatterfield::grid::Fidelity;
use scatterfield::{sim_radar, Config};

#[test]
fn interference_buffer_carries_the_delay_induced_beat_and_baseband_stays_zero() {
    let fs = 100e6;
    let n = 256;
    let sweep_s = 40e-6;
    let radar = common::fmcw_radar(77e9, 81e9, sweep_s, 30.0, fs);
    let mut interferer = common::fmcw_radar(77e9, 81e9, sweep_s, 30.0, fs);
    interferer.motion = scatterfield::motion::MotionModel::stationary(scatterfield::geom::Vec3::new(100.0, 0.0, 0.0));

    let mut config = Config::default();
    config.noise_scale = 0.0;

    let result = sim_radar(&radar, &[], &[], &[0.0], n, Fidelity::Sample, std::slice::from_ref(&interferer), &config, None).unwrap();

    assert!(result.grid.baseband.iter().all(|c| c.norm() == 0.0));
    assert!(result.grid.interference.iter().any(|c| c.norm() > 0.0));

    let samples: Vec<_> = (0..n).map(|s| result.grid.interference[[0, 0, s]]).collect();

    let slope = (81e9_f64 - 77e9_f64) / sweep_s;
    let tau = 100.0 / scatterfield::constants::VEL_C;
    let expected_freq = slope * tau;
    let bin_width = fs / n as f64;
    let expected_bin = (expected_freq / bin_width).round() as i64;

    let observed_bin = (0..n)
        .map(|k| (k as i64, common::dft_bin(&samples, k as f64)))
        .fold((0i64, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0;

    let diff = (observed_bin - expected_bin).rem_euclid(n as i64);
    let wrapped_diff = diff.min(n as i64 - diff);
    assert!(
        wrapped_diff <= 1,
        "observed bin {observed_bin}, expected bin {expected_bin}"
    );
}
