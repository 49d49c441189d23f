//! Multilayer thin-film model swept over wavelength.
//!
//! [`TmmModel`] holds the geometry of a planar stack (thicknesses, refractive
//! indices and incidence angle) and evaluates the coherent solver in
//! [`crate::tmm`] once per wavelength of a closed sweep. Wavelengths are
//! independent of each other, so the sweep runs on the rayon thread pool and
//! the records are collected back in sweep order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{DEFAULT_AMOUNT, DEFAULT_LAMBDA_MAX, DEFAULT_LAMBDA_MIN};
use crate::plot::{self, Series};
use crate::sweep::Sweep;
use crate::tmm::{coh_tmm, CohTmmData, Polarization, TmmError};

/// Planar stack of optically uniform layers.
///
/// The first and last entries of `d_list` and `n_list` describe the
/// semi-infinite incident and exit media; their thicknesses are expected to
/// be `f64::INFINITY`. Nothing is checked on construction: an inconsistent
/// stack is reported by the solver as a [`TmmError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TmmModel {
    d_list: Vec<f64>,
    n_list: Vec<Complex64>,
    theta: f64,
    pol: Polarization,
}

impl TmmModel {
    /// Creates a model for s-polarized light at incidence angle `theta`
    /// (radians, 0 for normal incidence).
    pub fn new(d_list: Vec<f64>, n_list: Vec<Complex64>, theta: f64) -> Self {
        Self {
            d_list,
            n_list,
            theta,
            pol: Polarization::S,
        }
    }

    /// Same stack, solved for another polarization.
    pub fn with_polarization(mut self, pol: Polarization) -> Self {
        self.pol = pol;
        self
    }

    pub fn d_list(&self) -> &[f64] {
        &self.d_list
    }

    pub fn n_list(&self) -> &[Complex64] {
        &self.n_list
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn polarization(&self) -> Polarization {
        self.pol
    }

    /// Solves the stack at `amount` wavelengths spanning
    /// `[lambda_min, lambda_max]`, both ends included.
    ///
    /// **Context**: This is the spectrum of the stack as seen from the
    /// incident medium. Unlike the Bragg grid the upper bound is part of the
    /// sweep and the last record echoes `lambda_max` exactly.
    ///
    /// **How it Works**:
    /// - the grid comes from [`Sweep::wavelengths_closed`]
    /// - every wavelength is solved by [`coh_tmm`] with the model's
    ///   polarization (s unless [`Self::with_polarization`] changed it)
    /// - wavelengths are independent, so they are solved on the rayon pool and
    ///   collected back in sweep order
    ///
    /// Returns one record per wavelength, in sweep order. The first solver
    /// error aborts the sweep and is returned unchanged.
    pub fn calculate_tmm(
        &self,
        lambda_min: f64,
        lambda_max: f64,
        amount: usize,
    ) -> Result<Vec<CohTmmData>, TmmError> {
        let wavelengths = Sweep::new(lambda_min, lambda_max, amount).wavelengths_closed();
        log::debug!(
            "tmm sweep over [{}, {}] with {} points, {} layers",
            lambda_min,
            lambda_max,
            amount,
            self.n_list.len()
        );
        self.solve(&wavelengths.to_vec())
    }

    /// [`Self::calculate_tmm`] over the default visible range.
    pub fn calculate_tmm_default(&self) -> Result<Vec<CohTmmData>, TmmError> {
        self.calculate_tmm(DEFAULT_LAMBDA_MIN, DEFAULT_LAMBDA_MAX, DEFAULT_AMOUNT)
    }

    /// Runs the sweep and plots reflectance and transmittance, one chart
    /// each, into `directory`. Returns the paths written.
    pub fn plot_reflection_and_transmission_amplitude(
        &self,
        lambda_min: f64,
        lambda_max: f64,
        amount: usize,
        directory: &Path,
    ) -> Result<Vec<PathBuf>> {
        let records = self.calculate_tmm(lambda_min, lambda_max, amount)?;
        plot_records(&records, directory)
    }

    fn solve(&self, wavelengths: &[f64]) -> Result<Vec<CohTmmData>, TmmError> {
        let start = Instant::now();
        let th_0 = Complex64::new(self.theta, 0.0);

        let pb = ProgressBar::new(wavelengths.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("wavelength");

        let records = wavelengths
            .par_iter()
            .map(|&lam_vac| {
                let record = coh_tmm(self.pol, &self.n_list, &self.d_list, th_0, lam_vac);
                pb.inc(1);
                record
            })
            .collect::<Result<Vec<_>, _>>();
        pb.finish_and_clear();

        log::info!(
            "solved {} wavelengths in {:.2?}",
            wavelengths.len(),
            start.elapsed()
        );
        records
    }
}

/// Which power fraction of a record to plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Reflectance,
    Transmittance,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Reflectance => "R",
            Field::Transmittance => "T",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Field::Reflectance => "Reflection amplitude",
            Field::Transmittance => "Transmission amplitude",
        }
    }

    pub fn value(&self, record: &CohTmmData) -> f64 {
        match self {
            Field::Reflectance => record.reflectance,
            Field::Transmittance => record.transmittance,
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Field::Reflectance => "reflection.png",
            Field::Transmittance => "transmission.png",
        }
    }
}

/// Wavelengths and one field of the records, in sweep order.
pub fn field_series(records: &[CohTmmData], field: Field) -> Series {
    let lam: Vec<f64> = records.iter().map(|record| record.lam_vac).collect();
    let values: Vec<f64> = records.iter().map(|record| field.value(record)).collect();
    Series::new(field.description(), lam, values)
}

/// Plots reflectance and transmittance of already computed records.
pub fn plot_records(records: &[CohTmmData], directory: &Path) -> Result<Vec<PathBuf>> {
    println!("Plotting the reflection and transmission amplitude of the model");
    let mut written = Vec::new();
    for field in [Field::Reflectance, Field::Transmittance] {
        let path = directory.join(field.file_name());
        plot::line_plot(
            &path,
            field.description(),
            "λ",
            field.key(),
            &[field_series(records, field)],
        )?;
        written.push(path);
    }
    Ok(written)
}

/// Record with the highest reflectance.
pub fn reflectance_peak(records: &[CohTmmData]) -> Option<&CohTmmData> {
    records
        .iter()
        .filter(|record| record.reflectance.is_finite())
        .max_by(|a, b| a.reflectance.total_cmp(&b.reflectance))
}

/// Thickness and index lists of `periods` repetitions of `cell` between two
/// semi-infinite media.
///
/// Each cell entry is a `(thickness, refractive index)` pair.
pub fn periodic_stack(
    incident: Complex64,
    cell: &[(f64, Complex64)],
    periods: usize,
    exit: Complex64,
) -> (Vec<f64>, Vec<Complex64>) {
    let mut d_list = vec![f64::INFINITY];
    let mut n_list = vec![incident];
    for _ in 0..periods {
        for &(thickness, index) in cell {
            d_list.push(thickness);
            n_list.push(index);
        }
    }
    d_list.push(f64::INFINITY);
    n_list.push(exit);
    (d_list, n_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AIR;

    fn scale_stack() -> TmmModel {
        let cell = [
            (91.67, Complex64::new(1.5, 0.0)),
            (137.5, Complex64::new(1.0, 0.0)),
        ];
        let (d_list, n_list) = periodic_stack(AIR, &cell, 4, AIR);
        TmmModel::new(d_list, n_list, 0.0)
    }

    #[test]
    fn periodic_stack_layout() {
        let model = scale_stack();
        assert_eq!(model.d_list().len(), 10);
        assert_eq!(model.n_list().len(), 10);
        assert_eq!(model.d_list()[0], f64::INFINITY);
        assert_eq!(model.d_list()[9], f64::INFINITY);
        assert_eq!(model.d_list()[1..3], [91.67, 137.5]);
        assert_eq!(model.n_list()[7], Complex64::new(1.5, 0.0));
        assert_eq!(model.polarization(), Polarization::S);
    }

    #[test]
    fn sweep_is_closed_and_ordered() {
        let records = scale_stack().calculate_tmm(400.0, 700.0, 31).unwrap();
        assert_eq!(records.len(), 31);
        assert_eq!(records[0].lam_vac, 400.0);
        assert_eq!(records[30].lam_vac, 700.0);
        assert!(records.windows(2).all(|w| w[0].lam_vac < w[1].lam_vac));
        assert!(records.iter().all(|r| r.pol == Polarization::S));
    }

    #[test]
    fn default_sweep() {
        let records = scale_stack().calculate_tmm_default().unwrap();
        assert_eq!(records.len(), DEFAULT_AMOUNT);
        assert_eq!(records[0].lam_vac, DEFAULT_LAMBDA_MIN);
        assert_eq!(records[DEFAULT_AMOUNT - 1].lam_vac, DEFAULT_LAMBDA_MAX);
    }

    #[test]
    fn solver_errors_propagate() {
        let model = TmmModel::new(vec![f64::INFINITY, 10.0], vec![AIR, AIR, AIR], 0.0);
        let err = model.calculate_tmm(400.0, 500.0, 5).unwrap_err();
        assert!(matches!(err, TmmError::LengthMismatch { .. }));
    }

    #[test]
    fn peak_sits_near_design_wavelength() {
        let records = scale_stack().calculate_tmm(400.0, 700.0, 301).unwrap();
        let peak = reflectance_peak(&records).unwrap();
        assert!((peak.lam_vac - 550.0).abs() < 5.0, "peak at {}", peak.lam_vac);
    }

    #[test]
    fn field_selection() {
        let records = scale_stack().calculate_tmm(500.0, 600.0, 3).unwrap();
        let r = field_series(&records, Field::Reflectance);
        let t = field_series(&records, Field::Transmittance);
        assert_eq!(r.x, vec![500.0, 550.0, 600.0]);
        assert_eq!(r.y[1], records[1].reflectance);
        assert_eq!(t.y[2], records[2].transmittance);
        assert_eq!(r.label, "Reflection amplitude");
        assert_eq!(Field::Transmittance.key(), "T");
    }

    #[test]
    fn plots_reflection_then_transmission() {
        let dir = std::env::temp_dir().join(format!("morpho-tmm-plot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let written = scale_stack()
            .plot_reflection_and_transmission_amplitude(250.0, 2000.0, 100, &dir)
            .unwrap();
        assert_eq!(
            written,
            vec![dir.join("reflection.png"), dir.join("transmission.png")]
        );
        for path in &written {
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn p_polarization_override() {
        let model = scale_stack().with_polarization(Polarization::P);
        let records = model.calculate_tmm(500.0, 600.0, 2).unwrap();
        assert!(records.iter().all(|r| r.pol == Polarization::P));
    }
}
