//! Cross-cutting invariants (spec.md §8): shape agreement, Friis accuracy,
//! RCS reciprocity, FMCW round-trip delay, idempotence, linearity and
//! back-propagation monotonicity.

mod common;

use num_complex::Complex;
use scatterfield::geom::Vec3;
use scatterfield::grid::Fidelity;
use scatterfield::mesh::PointTarget;
use scatterfield::{sim_radar, sim_rcs, Config};

#[test]
fn baseband_noise_and_timestamp_grids_share_one_shape() {
    let radar = common::cw_radar_multi_pulse(24e9, 30.0, 1e6, 4, 100e-6);
    let point = PointTarget::constant(Vec3::new(10.0, 0.0, 0.0), Vec3::zero(), 0.0, 0.0);
    let config = Config::default();

    let result = sim_radar(&radar, &[], &[point], &[0.0, 1e-3], 8, Fidelity::Sample, &[], &config, None).unwrap();

    assert_eq!(result.grid.baseband.dim(), result.grid.noise.dim());
    assert_eq!(result.grid.baseband.dim(), result.grid.interference.dim());
    assert_eq!(result.grid.baseband.dim(), result.timestamps.dim());
}

#[test]
fn zero_velocity_point_target_matches_friis_within_tenth_of_a_db() {
    let radar = common::cw_radar(24e9, 30.0, 1e6);
    let point = PointTarget::constant(Vec3::new(10.0, 0.0, 0.0), Vec3::zero(), 0.0, 0.0);
    let config = Config::default();

    let result = sim_radar(&radar, &[], &[point], &[0.0], 1, Fidelity::Sample, &[], &config, None).unwrap();

    let lambda = scatterfield::constants::VEL_C / 24e9;
    let p_tx_w = radar.tx.tx_power_w();
    let r = 10.0;
    let expected = lambda * p_tx_w.sqrt() / ((4.0 * std::f64::consts::PI).powf(1.5) * r * r);
    let observed = result.grid.baseband[[0, 0, 0]].norm();

    let error_db = 20.0 * (observed / expected).log10();
    assert!(error_db.abs() < 0.1, "observed {observed}, expected {expected} ({error_db} dB)");
}

#[test]
fn rcs_is_reciprocal_under_tx_rx_position_and_polarisation_swap() {
    let target = common::flat_plate(1.0, Vec3::zero());
    let freq_hz = 10e9;
    let pol_a = Vec3::new(Complex::new(1.0, 0.0), Complex::new(0.0, 0.0), Complex::new(0.0, 0.0));
    let pol_b = Vec3::new(Complex::new(0.0, 0.0), Complex::new(1.0, 0.0), Complex::new(0.0, 0.0));
    let config = Config::default();

    let forward = sim_rcs(
        std::slice::from_ref(&target),
        freq_hz,
        &[0.1],
        &[-std::f64::consts::FRAC_PI_2 + 0.05],
        &[std::f64::consts::PI - 0.1],
        &[std::f64::consts::FRAC_PI_2 - 0.05],
        pol_a,
        pol_b,
        16.0,
        &config,
    )
    .unwrap();

    let reversed = sim_rcs(
        std::slice::from_ref(&target),
        freq_hz,
        &[std::f64::consts::PI - 0.1],
        &[std::f64::consts::FRAC_PI_2 - 0.05],
        &[0.1],
        &[-std::f64::consts::FRAC_PI_2 + 0.05],
        pol_b,
        pol_a,
        16.0,
        &config,
    )
    .unwrap();

    assert!(
        (forward[0] - reversed[0]).abs() / forward[0] < 0.05,
        "forward {}, reversed {}",
        forward[0],
        reversed[0]
    );
}

#[test]
fn fmcw_round_trip_delay_lands_within_one_range_fft_bin() {
    let f0 = 77e9;
    let f1 = 81e9;
    let sweep_s = 40e-6;
    let fs = 3.2e6;
    let n = 128;
    let range_m = 35.0;

    let radar = common::fmcw_radar(f0, f1, sweep_s, 30.0, fs);
    let point = PointTarget::constant(Vec3::new(range_m, 0.0, 0.0), Vec3::zero(), 0.0, 0.0);
    let config = Config::default();

    let result = sim_radar(&radar, &[], &[point], &[0.0], n, Fidelity::Sample, &[], &config, None).unwrap();
    let fast_time: Vec<_> = (0..n).map(|s| result.grid.baseband[[0, 0, s]]).collect();

    let slope = (f1 - f0) / sweep_s;
    let bin_width = fs / n as f64;
    let raw_bin = 2.0 * range_m * slope / scatterfield::constants::VEL_C / bin_width;
    let expected_bin = (raw_bin.round() as i64).rem_euclid(n as i64);

    let observed_bin = (0..n)
        .map(|k| (k as i64, common::dft_bin(&fast_time, k as f64)))
        .fold((0i64, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0;

    let diff = (observed_bin - expected_bin).rem_euclid(n as i64);
    let wrapped_diff = diff.min(n as i64 - diff);
    assert!(wrapped_diff <= 1, "observed bin {observed_bin}, expected bin {expected_bin}");
}

#[test]
fn repeated_runs_with_noise_disabled_are_bit_for_bit_identical() {
    let radar = common::cw_radar_multi_pulse(24e9, 30.0, 1e6, 8, 100e-6);
    let point = PointTarget::constant(Vec3::new(12.0, 3.0, 0.0), Vec3::new(-5.0, 0.0, 0.0), 0.0, 0.0);
    let mut config = Config::default();
    config.noise_scale = 0.0;

    let a = sim_radar(&radar, &[], &[point.clone()], &[0.0], 4, Fidelity::Sample, &[], &config, None).unwrap();
    let b = sim_radar(&radar, &[], &[point], &[0.0], 4, Fidelity::Sample, &[], &config, None).unwrap();

    for (x, y) in a.grid.baseband.iter().zip(b.grid.baseband.iter()) {
        assert_eq!(x.re.to_bits(), y.re.to_bits());
        assert_eq!(x.im.to_bits(), y.im.to_bits());
    }
}

#[test]
fn sim_radar_is_linear_over_disjoint_non_shadowing_point_targets() {
    let radar = common::cw_radar(24e9, 30.0, 1e6);
    let point_a = PointTarget::constant(Vec3::new(10.0, 0.0, 0.0), Vec3::zero(), 0.0, 0.0);
    let point_b = PointTarget::constant(Vec3::new(40.0, 5.0, 0.0), Vec3::zero(), 3.0, 0.0);
    let mut config = Config::default();
    config.noise_scale = 0.0;

    let combined = sim_radar(&radar, &[], &[point_a.clone(), point_b.clone()], &[0.0], 1, Fidelity::Sample, &[], &config, None).unwrap();
    let only_a = sim_radar(&radar, &[], &[point_a], &[0.0], 1, Fidelity::Sample, &[], &config, None).unwrap();
    let only_b = sim_radar(&radar, &[], &[point_b], &[0.0], 1, Fidelity::Sample, &[], &config, None).unwrap();

    let sum = only_a.grid.baseband[[0, 0, 0]] + only_b.grid.baseband[[0, 0, 0]];
    let combined_value = combined.grid.baseband[[0, 0, 0]];

    assert!((combined_value - sum).norm() / sum.norm() < 1e-9, "combined {combined_value}, sum {sum}");
}

#[test]
fn enabling_back_propagation_never_removes_nonzero_bins() {
    let radar = common::cw_radar(10e9, 30.0, 1e6);
    let plate = common::flat_plate(1.0, Vec3::new(5.0, 0.0, 0.0));

    let mut config_off = Config::default();
    config_off.back_propagating = false;
    let mut config_on = Config::default();
    config_on.back_propagating = true;

    let off = sim_radar(&radar, std::slice::from_ref(&plate), &[], &[0.0], 1, Fidelity::Sample, &[], &config_off, None).unwrap();
    let on = sim_radar(&radar, std::slice::from_ref(&plate), &[], &[0.0], 1, Fidelity::Sample, &[], &config_on, None).unwrap();

    for (off_val, on_val) in off.grid.baseband.iter().zip(on.grid.baseband.iter()) {
        if off_val.norm() > 0.0 {
            assert!(on_val.norm() > 0.0);
        }
    }
}
