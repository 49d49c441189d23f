use std::f64::consts::PI;

use approx::assert_relative_eq;
use morpho::bragg::{normalize_to_peak, BraggModel};
use morpho::multilayer::{periodic_stack, TmmModel};
use morpho::settings::{self, Model};
use morpho::tmm::{coh_tmm, Polarization};
use num_complex::Complex64;

fn scale_geometry() -> TmmModel {
    let d_list = vec![
        f64::INFINITY,
        91.67,
        137.5,
        91.67,
        137.5,
        91.67,
        137.5,
        91.67,
        137.5,
        f64::INFINITY,
    ];
    let n_list = [1.0, 1.5, 1.0, 1.5, 1.0, 1.5, 1.0, 1.5, 1.0, 1.0]
        .iter()
        .map(|&n| Complex64::new(n, 0.0))
        .collect();
    TmmModel::new(d_list, n_list, 0.0)
}

#[test]
fn bragg_sweep_is_half_open() {
    let model = BraggModel::new(0.0, 550.0, 4);
    let (wavelengths, intensities) = model.compute_intensity_interval(200.0, 800.0, 1000);

    assert_eq!(wavelengths.len(), 1000);
    assert_eq!(intensities.len(), 1000);
    assert_eq!(wavelengths[0], 200.0);
    assert!(wavelengths[999] < 800.0);
    assert_relative_eq!(wavelengths[1] - wavelengths[0], 0.6, epsilon = 1e-9);
}

#[test]
fn bragg_first_sample_matches_formula() {
    let model = BraggModel::new(0.0, 550.0, 4);
    let (_, intensities) = model.compute_intensity_interval(200.0, 800.0, 1000);

    let k = 2.0 * PI / 200.0;
    let x = 0.5 * k * 550.0 * 2.0;
    let expected = ((x * 4.0).sin() / x.sin()).powi(2);
    assert!(intensities[0].is_finite());
    assert_relative_eq!(intensities[0], expected, max_relative = 1e-9, epsilon = 1e-30);
}

#[test]
fn bragg_normalized_spectrum_peaks_at_one() {
    let model = BraggModel::new(0.0, 550.0, 4);
    let (_, intensities) = model.compute_intensity_interval(200.0, 800.0, 1000);
    let normalized = normalize_to_peak(&intensities);

    let peak = normalized.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(peak, 1.0);
    assert!(normalized.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn tmm_sweep_is_closed() {
    let records = scale_geometry().calculate_tmm(250.0, 850.0, 1000).unwrap();

    assert_eq!(records.len(), 1000);
    assert_eq!(records[0].lam_vac, 250.0);
    assert_eq!(records[999].lam_vac, 850.0);
    for record in &records {
        assert!((0.0..=1.0).contains(&record.reflectance));
        assert!((0.0..=1.0).contains(&record.transmittance));
        assert!(record.reflectance + record.transmittance <= 1.0 + 1e-6);
        assert_relative_eq!(record.reflectance + record.transmittance, 1.0, epsilon = 1e-6);
        assert_eq!(record.pol, Polarization::S);
    }
}

#[test]
fn tmm_records_match_direct_solve() {
    let model = scale_geometry();
    let records = model.calculate_tmm(400.0, 700.0, 7).unwrap();
    for record in &records {
        let direct = coh_tmm(
            Polarization::S,
            model.n_list(),
            model.d_list(),
            Complex64::new(0.0, 0.0),
            record.lam_vac,
        )
        .unwrap();
        assert_eq!(record.reflectance, direct.reflectance);
        assert_eq!(record.transmittance, direct.transmittance);
    }
}

#[test]
fn default_config_builds_scale_geometry() {
    let settings = settings::load_default_config().unwrap();
    assert_eq!(settings.model, Model::Tmm);

    let model = settings.tmm_model();
    let reference = scale_geometry();
    assert_eq!(model.d_list(), reference.d_list());
    assert_eq!(model.n_list(), reference.n_list());

    let cell = [
        (91.67, Complex64::new(1.5, 0.0)),
        (137.5, Complex64::new(1.0, 0.0)),
    ];
    let one = Complex64::new(1.0, 0.0);
    let (d_list, n_list) = periodic_stack(one, &cell, 4, one);
    assert_eq!(d_list, reference.d_list());
    assert_eq!(n_list, reference.n_list());
}

#[test]
fn default_config_bragg_path() {
    let settings = settings::load_default_config().unwrap();
    let model = settings.bragg_model();
    assert_eq!(model.theta(), 0.0);
    assert_eq!(model.spacing(), 550.0);
    assert_eq!(model.lamellae(), 4);

    let sweep = settings.bragg.sweep;
    let (wavelengths, _) =
        model.compute_intensity_interval(sweep.lambda_min, sweep.lambda_max, sweep.amount);
    assert_eq!(wavelengths.len(), 1000);
    assert_eq!(wavelengths[0], 200.0);
}
