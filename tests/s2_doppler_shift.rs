//! Scenario S2 (spec.md §8): same CW 24 GHz radar as S1, point target moving
//! at v=(-30,0,0) m/s, 64 pulses at PRI=100 µs. The slow-time sequence
//! should show a beat frequency of 2·v·f_c/c = 4.8 kHz.

mod common;

use scatterfield::geom::Vec3;
use scatterfield::grid::Fidelity;
use scatterfield::mesh::PointTarget;
use scatterfield::{sim_radar, Config};

#[test]
fn slow_time_beat_frequency_matches_doppler_prediction() {
    let freq_hz = 24e9;
    let num_pulses = 64;
    let pri_s = 100e-6;
    let radar = common::cw_radar_multi_pulse(freq_hz, 30.0, 1e6, num_pulses, pri_s);
    let point = PointTarget::constant(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-30.0, 0.0, 0.0), 0.0, 0.0);
    let config = Config::default();

    let result = sim_radar(&radar, &[], &[point], &[0.0], 1, Fidelity::Sample, &[], &config, None).unwrap();

    let slow_time: Vec<_> = (0..num_pulses).map(|p| result.grid.baseband[[0, p, 0]]).collect();

    let prf = 1.0 / pri_s;
    let expected_fd = 2.0 * 30.0 * freq_hz / scatterfield::constants::VEL_C;
    let bin_width = prf / num_pulses as f64;
    let expected_bin = (expected_fd / bin_width).round() as i64;

    let observed_bin = (0..num_pulses / 2)
        .map(|k| (k as i64, common::dft_bin(&slow_time, k as f64)))
        .fold((0i64, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0;

    assert!(
        (observed_bin - expected_bin).abs() <= 1,
        "observed bin {observed_bin}, expected bin {expected_bin}"
    );
}
